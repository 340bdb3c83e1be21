//! Get shared secret API endpoint
//!
//! This is the only unauthenticated route in the API. Recipients follow a
//! share link and fetch the sealed record by id; possession of the link is
//! the access credential. Expired records are reported exactly like records
//! that never existed.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::create::SharedSecretPayload;
use crate::http_server::api::client::ApiRequest;
use crate::secret_store::StoreError;
use crate::ServiceState;

/// Request to get a shared secret by ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRequest {
    pub secret_id: Uuid,
}

/// Response containing the sealed record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetResponse {
    pub shared_secret: SharedSecretPayload,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Path(secret_id): Path<Uuid>,
) -> Result<impl IntoResponse, GetError> {
    let record = state.store().get_by_id(secret_id).await?;

    Ok((
        http::StatusCode::OK,
        Json(GetResponse {
            shared_secret: record.into(),
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum GetError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for GetError {
    fn into_response(self) -> Response {
        let GetError::Store(err) = self;
        match err {
            StoreError::NotFound => {
                (http::StatusCode::NOT_FOUND, "shared secret not found").into_response()
            }
            other => {
                tracing::error!("failed to fetch shared secret: {}", other);
                (
                    http::StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error",
                )
                    .into_response()
            }
        }
    }
}

impl ApiRequest for GetRequest {
    type Response = GetResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url
            .join(&format!("/shared-secrets/{}", self.secret_id))
            .unwrap();
        client.get(full_url)
    }
}
