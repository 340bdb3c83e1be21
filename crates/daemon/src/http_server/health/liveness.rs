use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Process-is-up probe; succeeds whenever the server can answer at all
pub async fn handler() -> Response {
    let msg = serde_json::json!({"status": "ok"});
    (StatusCode::OK, Json(msg)).into_response()
}
