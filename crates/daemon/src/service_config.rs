use std::path::PathBuf;
use std::time::Duration;

use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// Port for the API HTTP server.
    pub api_port: u16,

    // auth configuration
    /// Owner every authenticated request acts as.
    pub owner_id: Uuid,
    /// Bearer token protecting the owner-facing endpoints.
    pub access_token: String,

    // data store configuration
    /// a path to a sqlite database, if not set then an
    ///  in-memory database will be used
    pub sqlite_path: Option<PathBuf>,
    /// how often the expiry sweep removes lapsed rows
    pub sweep_interval: Duration,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Default cadence for the background expiry sweep.
    pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);
}
