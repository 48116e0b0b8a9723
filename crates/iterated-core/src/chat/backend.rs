use async_trait::async_trait;
use thiserror::Error;

use super::{ChatRequest, ChatResponse};

/// Failure to obtain a well-formed response from the tutor backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("request cancelled")]
    Cancelled,
}

/// The outbound side of the chat exchange.
///
/// A backend answers with the endpoint's JSON body whether it reports success
/// or failure; `Err` is reserved for transport problems and bodies that are
/// not the expected JSON.
#[async_trait]
pub trait TutorBackend: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError>;

    /// Tell the backend a session is over. Backends without per-session
    /// resources can keep the default.
    async fn end_session(&self, _session_id: &str) -> Result<(), BackendError> {
        Ok(())
    }
}
