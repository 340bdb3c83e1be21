use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use constant_time_eq::constant_time_eq;
use http::StatusCode;
use uuid::Uuid;

use crate::ServiceState;

/// Identity attached to requests that presented a valid bearer token
#[derive(Debug, Clone, Copy)]
pub struct Owner(pub Uuid);

/// Require `Authorization: Bearer <access_token>` on owner-facing routes
///
/// Comparison is constant-time. On success the resolved [`Owner`] is added
/// to request extensions for handlers to extract; everything else gets an
/// opaque 401.
pub async fn require_auth(
    State(state): State<ServiceState>,
    mut request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match presented {
        Some(token) if constant_time_eq(token.as_bytes(), state.access_token().as_bytes()) => {
            request.extensions_mut().insert(Owner(state.owner_id()));
            next.run(request).await
        }
        _ => {
            let msg = serde_json::json!({"msg": "unauthorized"});
            (StatusCode::UNAUTHORIZED, Json(msg)).into_response()
        }
    }
}
