//! List shared secrets API endpoint
//!
//! Scoped to the authenticated owner and filtered to live records, so the
//! listing never resurrects anything a recipient could no longer fetch.

use axum::extract::{Extension, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::create::SharedSecretPayload;
use crate::http_server::api::client::ApiRequest;
use crate::http_server::auth::Owner;
use crate::secret_store::StoreError;
use crate::ServiceState;

/// Request to list the caller's live shared secrets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRequest {}

/// Response containing all live shared secrets for the owner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub shared_secrets: Vec<SharedSecretPayload>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Extension(owner): Extension<Owner>,
) -> Result<impl IntoResponse, ListError> {
    let records = state.store().list_for_owner(owner.0).await?;
    let payloads: Vec<SharedSecretPayload> = records.into_iter().map(Into::into).collect();

    Ok((
        http::StatusCode::OK,
        Json(ListResponse {
            shared_secrets: payloads,
        }),
    )
        .into_response())
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ListError {
    fn into_response(self) -> Response {
        let ListError::Store(err) = self;
        tracing::error!("failed to list shared secrets: {}", err);
        (
            http::StatusCode::INTERNAL_SERVER_ERROR,
            "internal server error",
        )
            .into_response()
    }
}

impl ApiRequest for ListRequest {
    type Response = ListResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join("/shared-secrets").unwrap();
        client.get(full_url)
    }
}
