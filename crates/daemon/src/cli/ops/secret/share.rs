use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::Args;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

use common::crypto::{CipherError, KeyDescriptor, LinkNonce, SecretKey};
use common::link::{LinkError, ShareLink};
use sealbox_daemon::http_server::api::client::ApiError;
use sealbox_daemon::http_server::api::shared_secrets::create::{CreateRequest, NewSharedSecret};
use sealbox_daemon::state::AppState;

#[derive(Args, Debug, Clone)]
pub struct Share {
    /// The secret to share
    #[arg(long)]
    pub secret: String,

    /// Minutes until the link expires (default 15, at most 90)
    #[arg(long)]
    pub ttl_minutes: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("could not seal the secret: {0}")]
    Cipher(#[from] CipherError),
    #[error("could not compose the share link: {0}")]
    Link(#[from] LinkError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Share {
    type Error = ShareError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();

        // Seal locally. The server receives the ciphertext and the exported
        // key, never the nonce; that rides only in the link fragment below.
        let key = SecretKey::generate();
        let nonce = LinkNonce::generate();
        let sealed = key.encrypt(&nonce, self.secret.as_bytes())?;

        let expires_at = self
            .ttl_minutes
            .map(|minutes| OffsetDateTime::now_utc() + Duration::minutes(minutes));

        let request = CreateRequest {
            shared_secret: NewSharedSecret {
                jwk: KeyDescriptor::from_key(&key),
                encrypted_secret: STANDARD.encode(&sealed),
                expires_at,
            },
        };
        let response = client.call(request).await?;
        let stored = response.shared_secret;

        // Compose the link against the configured public origin, falling
        // back to wherever this client is pointed.
        let origin = AppState::load(ctx.config_path.clone())
            .map(|state| state.config.share_origin())
            .unwrap_or_else(|_| client.base_url().clone());
        let url = ShareLink::new(stored.id, nonce).to_url(&origin)?;

        let valid_until = stored
            .expires_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| stored.expires_at.to_string());

        Ok(format!(
            "Share this link (valid until {}):\n\n  {}\n\nIt can be opened any number of times until it expires.",
            valid_until, url
        ))
    }
}
