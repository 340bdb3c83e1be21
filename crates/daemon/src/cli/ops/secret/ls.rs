use clap::Args;
use time::format_description::well_known::Rfc3339;

use sealbox_daemon::http_server::api::client::ApiError;
use sealbox_daemon::http_server::api::shared_secrets::list::ListRequest;

#[derive(Args, Debug, Clone)]
pub struct Ls;

#[derive(Debug, thiserror::Error)]
pub enum LsError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Ls {
    type Error = LsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();

        let response = client.call(ListRequest::default()).await?;

        if response.shared_secrets.is_empty() {
            return Ok("No shared secrets".to_string());
        }

        let output = response
            .shared_secrets
            .iter()
            .map(|secret| {
                let expires = secret
                    .expires_at
                    .format(&Rfc3339)
                    .unwrap_or_else(|_| secret.expires_at.to_string());
                format!("{}  expires {}", secret.id, expires)
            })
            .collect::<Vec<_>>()
            .join("\n");
        Ok(output)
    }
}
