use thiserror::Error;

/// Reasons a session operation was rejected.
///
/// These are validation outcomes, not failures: presentation layers treat
/// them as silent no-ops.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("answer must not be empty")]
    EmptyAnswer,

    #[error("message must not be empty")]
    EmptyMessage,

    #[error("a request is already in flight")]
    RequestInFlight,

    #[error("no session has been started")]
    NotStarted,
}
