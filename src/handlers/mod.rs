pub mod items;

use axum::{http::StatusCode, Json};
use serde_json::json;

pub async fn ping() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "ok": true })))
}

/// Cross-origin preflight. The CORS headers themselves come from the middleware.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}
