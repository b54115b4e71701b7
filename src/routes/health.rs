use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub const SERVICE_NAME: &str = "skillbridge-backend";

#[axum::debug_handler]
pub async fn root() -> impl IntoResponse {
    let body = json!({
        "status": "ok",
        "service": SERVICE_NAME,
    });
    (StatusCode::OK, Json(body))
}
