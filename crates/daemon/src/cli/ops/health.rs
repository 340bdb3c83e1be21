use clap::Args;

use sealbox_daemon::state::AppState;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("Health check failed: {0}")]
    Failed(String),
}

async fn probe(client: &reqwest::Client, url: &str) -> String {
    match client.get(url).send().await {
        Ok(resp) if resp.status().is_success() => "OK".to_string(),
        Ok(resp) => format!("UNHEALTHY ({})", resp.status()),
        Err(_) => "NOT REACHABLE".to_string(),
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = HealthError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut lines = Vec::new();

        // Local side: the config directory sealbox init created.
        lines.push("Config:".to_string());
        match AppState::load(ctx.config_path.clone()) {
            Ok(state) => {
                lines.push(format!("  directory:    {}", state.sealbox_dir.display()));
                lines.push("  config.toml:  OK".to_string());
                lines.push("  db.sqlite:    OK".to_string());
                lines.push(format!("  api_port:     {}", state.config.api_port));
                lines.push(format!("  share origin: {}", state.config.share_origin()));
                lines.push("  access token: present".to_string());
            }
            Err(e) => {
                lines.push(format!("  error: {}", e));
            }
        }

        // Remote side: whichever daemon this client points at.
        let base = ctx.client.base_url();
        let client = ctx.client.http_client();
        let base_trimmed = base.as_str().trim_end_matches('/');

        lines.push(String::new());
        lines.push(format!("Daemon ({}):", base));

        let livez = probe(client, &format!("{}/_status/livez", base_trimmed)).await;
        lines.push(format!("  livez:  {}", livez));

        let readyz = probe(client, &format!("{}/_status/readyz", base_trimmed)).await;
        lines.push(format!("  readyz: {}", readyz));

        Ok(lines.join("\n"))
    }
}
