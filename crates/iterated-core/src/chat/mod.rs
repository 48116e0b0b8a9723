pub mod backend;
pub mod request;
pub mod response;

pub use backend::{BackendError, TutorBackend};
pub use request::ChatRequest;
pub use response::{iso_timestamp, ChatResponse, INTERNAL_SERVER_ERROR};
