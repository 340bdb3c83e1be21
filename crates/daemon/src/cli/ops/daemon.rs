use clap::Args;

use sealbox_daemon::state::AppState;
use sealbox_daemon::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override API server port (default from config)
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    StateError(#[from] sealbox_daemon::state::StateError),

    #[error("daemon failed: {0}")]
    Failed(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // Load state from config path (or default ~/.sealbox)
        let state = AppState::load(ctx.config_path.clone())?;

        // Use port from flag or config
        let api_port = self.api_port.unwrap_or(state.config.api_port);

        let config = ServiceConfig {
            api_port,
            owner_id: state.config.owner_id,
            access_token: state.config.access_token.clone(),
            sqlite_path: Some(state.db_path),
            sweep_interval: ServiceConfig::DEFAULT_SWEEP_INTERVAL,
            log_level: tracing::Level::DEBUG,
            log_dir: self.log_dir.clone(),
        };

        spawn_service(&config).await;
        Ok("daemon ended".to_string())
    }
}
