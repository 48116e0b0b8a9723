//! IteratED core: the chat data model, the JSON wire contract shared by the
//! client and the endpoint, and the presentation-independent session state
//! machine.

pub mod types;
pub mod chat;
pub mod session;

pub use types::{Message, MessageId, Sender};

pub use chat::{
    iso_timestamp,
    BackendError,
    ChatRequest,
    ChatResponse,
    TutorBackend,
    INTERNAL_SERVER_ERROR,
};

pub use session::{
    welcome_text,
    ChatSession,
    Completion,
    PendingRequest,
    SessionError,
    SessionOptions,
    SessionPhase,
    APOLOGY,
};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
