use clap::Args;
use url::Url;

use sealbox_daemon::state::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Port the daemon API will listen on
    #[arg(long, default_value_t = 3000)]
    pub api_port: u16,

    /// Origin share links are composed against (e.g. https://box.example.com).
    /// Defaults to http://localhost:<api-port>.
    #[arg(long)]
    pub public_origin: Option<Url>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("state error: {0}")]
    StateError(#[from] sealbox_daemon::state::StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut config = AppConfig::generate();
        config.api_port = self.api_port;
        config.public_origin = self.public_origin.clone();

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        // The token itself is never printed, only where to find it.
        Ok([
            format!("Initialized {}", state.sealbox_dir.display()),
            format!("  config:       {}", state.config_path.display()),
            format!("  database:     {}", state.db_path.display()),
            format!("  api_port:     {}", state.config.api_port),
            format!("  share origin: {}", state.config.share_origin()),
            format!("  owner_id:     {}", state.config.owner_id),
            "  access token: stored in config.toml".to_string(),
        ]
        .join("\n"))
    }
}
