use axum::extract::FromRef;
use url::Url;
use uuid::Uuid;

use crate::database::{Database, DatabaseSetupError};
use crate::secret_store::{SecretStore, TtlPolicy};
use crate::service_config::Config;

/// Shared handles every request handler works against
#[derive(Clone)]
pub struct State {
    database: Database,
    store: SecretStore,
    owner_id: Uuid,
    access_token: String,
}

#[allow(dead_code)]
impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        let sqlite_database_url = match &config.sqlite_path {
            Some(path) => {
                if !path.exists() {
                    return Err(StateSetupError::DatabasePathDoesNotExist);
                }
                Url::parse(&format!("sqlite://{}", path.display()))
                    .map_err(|_| StateSetupError::InvalidDatabaseUrl)?
            }
            None => {
                Url::parse("sqlite::memory:").map_err(|_| StateSetupError::InvalidDatabaseUrl)?
            }
        };
        tracing::info!(url = %sqlite_database_url, "connecting to database");

        let database = Database::connect(&sqlite_database_url).await?;
        let store = SecretStore::new(database.clone(), TtlPolicy::default());

        Ok(Self {
            database,
            store,
            owner_id: config.owner_id,
            access_token: config.access_token.clone(),
        })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn store(&self) -> &SecretStore {
        &self.store
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

// Lets the readiness probe pull a Database straight out of router state.
impl FromRef<State> for Database {
    fn from_ref(state: &State) -> Database {
        state.database.clone()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("the configured database path does not exist; run 'sealbox init' first")]
    DatabasePathDoesNotExist,
    #[error("the configured database path does not form a valid url")]
    InvalidDatabaseUrl,
    #[error("failed to set up the database: {0}")]
    DatabaseSetupError(#[from] DatabaseSetupError),
}
