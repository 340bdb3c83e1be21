use axum::routing::{delete, get, post};
use axum::{middleware, Router};

pub mod create;
pub mod delete_secret;
pub mod get;
pub mod list;

pub use create::SharedSecretPayload;

use crate::http_server::auth::require_auth;
use crate::ServiceState;

/// Routes under `/shared-secrets`
///
/// Fetch-by-id stays public: the recipient of a share link holds nothing but
/// the link, and the ciphertext is useless without the fragment nonce.
/// Everything that creates, enumerates, or destroys records requires the
/// owner's bearer token.
pub fn router(state: ServiceState) -> Router<ServiceState> {
    let public = Router::new().route("/:secret_id", get(get::handler));

    let protected = Router::new()
        .route("/", post(create::handler))
        .route("/", get(list::handler))
        .route("/:secret_id", delete(delete_secret::handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(state)
}
