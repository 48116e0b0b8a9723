use std::sync::Arc;

use axum::{
    body::to_bytes,
    extract::{Request, State},
    response::Json,
};
use iterated_core::{ChatRequest, ChatResponse};
use serde_json::Value;
use tracing::Instrument;

use crate::error::ServerError;
use crate::state::AppState;

/// `POST /api/chat`
///
/// The body is read and parsed by hand so that unreadable or malformed
/// bodies produce the endpoint's own failure shape instead of an extractor
/// rejection.
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<ChatResponse>, ServerError> {
    let body = to_bytes(request.into_body(), state.max_body_bytes)
        .await
        .map_err(|e| ServerError::Body(e.to_string()))?;

    let value: Value = serde_json::from_slice(&body)?;
    let chat_request = ChatRequest::from_json_lenient(&value).ok_or(ServerError::NullBody)?;

    let span = tracing::info_span!("chat", session_id = %chat_request.session_id);
    async move {
        tracing::info!("Processing chat request: {:?}", chat_request);

        let reply = state.responder.respond(&chat_request).await?;
        Ok::<_, ServerError>(Json(ChatResponse::ok(reply)))
    }
    .instrument(span)
    .await
}
