pub mod chat;
pub mod health;
pub mod session;

pub use chat::chat_handler;
pub use health::health_handler;
pub use session::end_session_handler;
