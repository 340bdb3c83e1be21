use clap::Args;
use url::Url;

use common::link;
use common::reveal::{RevealFailure, RevealState};
use sealbox_daemon::http_server::api::client::ApiError;
use sealbox_daemon::http_server::api::shared_secrets::get::GetRequest;

#[derive(Args, Debug, Clone)]
pub struct Reveal {
    /// The share link, including its #fragment
    #[arg(long)]
    pub link: Url,
}

#[derive(Debug, thiserror::Error)]
pub enum RevealError {
    #[error("{0}")]
    Failed(RevealFailure),
    #[error("invalid share link: {0}")]
    Link(#[from] link::LinkError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Reveal {
    type Error = RevealError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();

        // The id is enough to fetch; the fragment is not needed until the
        // decrypt step, and it never leaves this process.
        let secret_id = link::secret_id(&self.link)?;

        let state = RevealState::start();
        let state = match client.call(GetRequest { secret_id }).await {
            Ok(response) => {
                let record = response.shared_secret;
                state.loaded(record.jwk, record.encrypted_secret)
            }
            Err(ApiError::HttpStatus(status, _)) if status == http::StatusCode::NOT_FOUND => {
                state.failed(RevealFailure::NotFound)
            }
            Err(e) => state.failed(RevealFailure::Transport(e.to_string())),
        };

        let state = match link::nonce(&self.link) {
            Ok(nonce) => state.reveal(&nonce),
            Err(e) => state.failed(RevealFailure::Link(e)),
        };

        match state {
            RevealState::Revealed { plaintext } => Ok(plaintext.to_string()),
            RevealState::Failed { reason } => Err(RevealError::Failed(reason)),
            // reveal() only leaves Decoding for a terminal state, so the
            // in-flight states cannot reach here.
            other => Err(RevealError::Failed(RevealFailure::Transport(format!(
                "reveal stalled in {:?}",
                other
            )))),
        }
    }
}
