use clap::Args;
use uuid::Uuid;

use sealbox_daemon::http_server::api::client::ApiError;
use sealbox_daemon::http_server::api::shared_secrets::delete_secret::DeleteRequest;

#[derive(Args, Debug, Clone)]
pub struct Rm {
    /// ID of the shared secret to revoke
    #[arg(long)]
    pub secret_id: Uuid,
}

#[derive(Debug, thiserror::Error)]
pub enum RmError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Rm {
    type Error = RmError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();

        let response = client
            .call(DeleteRequest {
                secret_id: self.secret_id,
            })
            .await?;

        if response.deleted {
            Ok(format!("Revoked {}", self.secret_id))
        } else {
            Ok(format!("Nothing to revoke for {}", self.secret_id))
        }
    }
}
