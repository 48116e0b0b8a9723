use iterated_core::BackendError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response ({status}): {message}")]
    InvalidResponse { status: u16, message: String },

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<ClientError> for BackendError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Network(e) => BackendError::Network(e.to_string()),
            other => BackendError::InvalidResponse(other.to_string()),
        }
    }
}
