pub mod error;
pub mod handlers;
pub mod logging;
pub mod responder;
pub mod server;
pub mod state;

pub use error::ServerError;
pub use responder::{CannedResponder, ReplyStrategy, Responder, Sequential, UniformRandom};
pub use server::{create_router, run_server};
pub use state::AppState;
