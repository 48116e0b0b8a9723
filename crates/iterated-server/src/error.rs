use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use iterated_core::ChatResponse;
use thiserror::Error;

/// Failures inside the chat endpoint.
///
/// Every variant renders as the same generic 500 body; the detail only
/// reaches the log.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to read request body: {0}")]
    Body(String),

    #[error("request body is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("request body has no fields")]
    NullBody,

    #[error("responder has no replies configured")]
    NoReplies,

    #[error("responder failed: {0}")]
    Responder(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!("Error in chat API: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ChatResponse::internal_error()),
        )
            .into_response()
    }
}
