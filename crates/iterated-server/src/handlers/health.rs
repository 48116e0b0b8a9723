use axum::response::{IntoResponse, Json};
use chrono::Utc;
use iterated_core::iso_timestamp;
use serde_json::json;

/// `GET /api/health`
pub async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": iso_timestamp(Utc::now()),
    }))
}
