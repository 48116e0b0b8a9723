use axum::{
    extract::Path,
    response::{IntoResponse, Json},
};
use serde_json::json;

/// `DELETE /api/session/:session_id`
///
/// The placeholder responder keeps nothing per session, so there is nothing
/// to release; the route exists so clients can end sessions the same way
/// against any backend.
pub async fn end_session_handler(Path(session_id): Path<String>) -> impl IntoResponse {
    tracing::info!(session_id = %session_id, "session ended");
    Json(json!({
        "success": true,
        "message": "Session ended",
    }))
}
