pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "sealbox")]
#[command(about = "Share short-lived encrypted secrets over links the server cannot read")]
pub struct Args {
    /// URL of the daemon API (defaults to the configured api_port)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the sealbox config directory (defaults to ~/.sealbox)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
