//! Delete shared secret API endpoint
//!
//! Revokes a link before its expiry. Deletion is owner-scoped and works on
//! expired rows too, so an owner can always clean up. The response reports
//! whether a row was actually removed.

use axum::extract::{Extension, Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http_server::api::client::ApiRequest;
use crate::http_server::auth::Owner;
use crate::secret_store::StoreError;
use crate::ServiceState;

/// Request to delete a shared secret
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub secret_id: Uuid,
}

/// Response indicating whether the shared secret was deleted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Extension(owner): Extension<Owner>,
    Path(secret_id): Path<Uuid>,
) -> Result<impl IntoResponse, DeleteError> {
    let deleted = state.store().delete(owner.0, secret_id).await?;
    if deleted {
        tracing::info!(id = %secret_id, "deleted shared secret");
    }

    Ok((http::StatusCode::OK, Json(DeleteResponse { deleted })).into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for DeleteError {
    fn into_response(self) -> Response {
        let DeleteError::Store(err) = self;
        tracing::error!("failed to delete shared secret: {}", err);
        (
            http::StatusCode::INTERNAL_SERVER_ERROR,
            "internal server error",
        )
            .into_response()
    }
}

impl ApiRequest for DeleteRequest {
    type Response = DeleteResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url
            .join(&format!("/shared-secrets/{}", self.secret_id))
            .unwrap();
        client.delete(full_url)
    }
}
