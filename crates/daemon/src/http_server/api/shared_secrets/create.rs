//! Create shared secret API endpoint

use axum::extract::{Extension, Json, State};
use axum::response::{IntoResponse, Response};
use common::crypto::KeyDescriptor;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::database::models::SharedSecret;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::auth::Owner;
use crate::secret_store::StoreError;
use crate::ServiceState;

/// Request to store a sealed secret
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub shared_secret: NewSharedSecret,
}

/// The sealed material the sender submits: descriptor and ciphertext, no
/// nonce anywhere
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSharedSecret {
    pub jwk: KeyDescriptor,
    pub encrypted_secret: String,
    /// When omitted the server applies its default TTL
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
}

/// Response containing the stored record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponse {
    pub shared_secret: SharedSecretPayload,
}

/// A stored shared secret as it appears on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedSecretPayload {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub jwk: KeyDescriptor,
    pub encrypted_secret: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<SharedSecret> for SharedSecretPayload {
    fn from(record: SharedSecret) -> Self {
        Self {
            id: *record.id,
            owner_id: *record.owner_id,
            jwk: record.key_descriptor.0,
            encrypted_secret: record.ciphertext,
            expires_at: record.expires_at,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

pub async fn handler(
    State(state): State<ServiceState>,
    Extension(owner): Extension<Owner>,
    Json(req): Json<CreateRequest>,
) -> Result<impl IntoResponse, CreateError> {
    let NewSharedSecret {
        jwk,
        encrypted_secret,
        expires_at,
    } = req.shared_secret;

    let record = state
        .store()
        .create(owner.0, jwk, encrypted_secret, expires_at)
        .await?;

    tracing::info!(id = %record.id, expires_at = %record.expires_at, "stored shared secret");

    Ok((
        http::StatusCode::OK,
        Json(CreateResponse {
            shared_secret: record.into(),
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for CreateError {
    fn into_response(self) -> Response {
        let CreateError::Store(err) = self;
        match err {
            StoreError::ExpiryTooFar(_) | StoreError::Descriptor(_) => {
                tracing::warn!("rejected shared secret: {}", err);
                (http::StatusCode::BAD_REQUEST, err.to_string()).into_response()
            }
            StoreError::NotFound => {
                (http::StatusCode::NOT_FOUND, "shared secret not found").into_response()
            }
            StoreError::Database(e) => {
                tracing::error!("failed to store shared secret: {}", e);
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error",
                )
                    .into_response()
            }
        }
    }
}

impl ApiRequest for CreateRequest {
    type Response = CreateResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/shared-secrets").unwrap();
        client.post(full_url).json(&self)
    }
}
