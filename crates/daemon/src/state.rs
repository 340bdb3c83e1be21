use std::fs;
use std::path::PathBuf;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

const APP_NAME: &str = "sealbox";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "db.sqlite";

fn default_api_port() -> u16 {
    3000
}

/// Contents of `config.toml`
///
/// Minted once by `sealbox init`. The access token is the bearer secret for
/// the owner-facing endpoints; the CLI reads it from here so the owner never
/// has to paste it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Origin share links are composed against. Defaults to
    /// http://localhost:<api_port> when unset.
    #[serde(default)]
    pub public_origin: Option<Url>,
    pub owner_id: Uuid,
    pub access_token: String,
}

impl AppConfig {
    /// Mint a fresh config with a new owner identity and access token
    pub fn generate() -> Self {
        Self {
            api_port: default_api_port(),
            public_origin: None,
            owner_id: Uuid::new_v4(),
            access_token: generate_access_token(),
        }
    }

    /// The origin the CLI composes share links against
    pub fn share_origin(&self) -> Url {
        match &self.public_origin {
            Some(origin) => origin.clone(),
            None => Url::parse(&format!("http://localhost:{}", self.api_port))
                .expect("default origin is a valid url"),
        }
    }
}

fn generate_access_token() -> String {
    let mut buff = [0u8; 32];
    getrandom::getrandom(&mut buff).expect("failed to generate random bytes");
    URL_SAFE_NO_PAD.encode(buff)
}

/// The on-disk `~/.sealbox` directory
#[derive(Debug, Clone)]
pub struct AppState {
    /// Root of the sealbox directory
    pub sealbox_dir: PathBuf,
    /// Path to the sqlite database file
    pub db_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Parsed contents of the config file
    pub config: AppConfig,
}

impl AppState {
    fn sealbox_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        match custom_path {
            Some(path) => Ok(path),
            None => Ok(dirs::home_dir()
                .ok_or(StateError::NoHomeDirectory)?
                .join(format!(".{}", APP_NAME))),
        }
    }

    pub fn exists(custom_path: Option<PathBuf>) -> Result<bool, StateError> {
        let sealbox_dir = Self::sealbox_dir(custom_path)?;
        Ok(sealbox_dir.exists())
    }

    /// Create the sealbox directory, config file, and empty database file
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let sealbox_dir = Self::sealbox_dir(custom_path)?;
        if sealbox_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }
        fs::create_dir_all(&sealbox_dir)?;

        let config = config.unwrap_or_else(AppConfig::generate);
        let config_path = sealbox_dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, toml::to_string_pretty(&config)?)?;

        let db_path = sealbox_dir.join(DB_FILE_NAME);
        fs::write(&db_path, "")?;

        Ok(Self {
            sealbox_dir,
            db_path,
            config_path,
            config,
        })
    }

    /// Load an initialized sealbox directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let sealbox_dir = Self::sealbox_dir(custom_path)?;
        if !sealbox_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = sealbox_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }
        let db_path = sealbox_dir.join(DB_FILE_NAME);
        if !db_path.exists() {
            return Err(StateError::MissingFile(DB_FILE_NAME.to_string()));
        }

        let config: AppConfig = toml::from_str(&fs::read_to_string(&config_path)?)?;

        Ok(Self {
            sealbox_dir,
            db_path,
            config_path,
            config,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("sealbox directory is not initialized. Run 'sealbox init' first")]
    NotInitialized,
    #[error("sealbox directory is already initialized")]
    AlreadyInitialized,
    #[error("could not determine a home directory")]
    NoHomeDirectory,
    #[error("missing expected file: {0}")]
    MissingFile(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize config: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("failed to parse config: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_then_load() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("state");

        let initialized = AppState::init(Some(root.clone()), None).unwrap();
        assert!(initialized.db_path.exists());
        assert!(initialized.config_path.exists());

        let loaded = AppState::load(Some(root)).unwrap();
        assert_eq!(loaded.config.owner_id, initialized.config.owner_id);
        assert_eq!(loaded.config.access_token, initialized.config.access_token);
        assert_eq!(loaded.config.api_port, 3000);
    }

    #[test]
    fn test_double_init_refused() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("state");

        AppState::init(Some(root.clone()), None).unwrap();
        assert!(matches!(
            AppState::init(Some(root), None),
            Err(StateError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_load_uninitialized() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nope");

        assert!(matches!(
            AppState::load(Some(root)),
            Err(StateError::NotInitialized)
        ));
    }

    #[test]
    fn test_share_origin_defaults_to_local_api_port() {
        let mut config = AppConfig::generate();
        config.api_port = 4444;
        assert_eq!(config.share_origin().as_str(), "http://localhost:4444/");

        config.public_origin = Some(Url::parse("https://box.example.com").unwrap());
        assert_eq!(
            config.share_origin().as_str(),
            "https://box.example.com/"
        );
    }

    #[test]
    fn test_generated_tokens_are_unique() {
        let a = AppConfig::generate();
        let b = AppConfig::generate();

        assert_ne!(a.access_token, b.access_token);
        assert_ne!(a.owner_id, b.owner_id);
        assert!(a.access_token.len() >= 40);
    }
}
