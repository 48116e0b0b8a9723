//! HTTP client for the chat endpoint.
//!
//! [`TutorClient`] is the network implementation of
//! [`iterated_core::TutorBackend`]; presentation layers hand it to a
//! [`iterated_core::ChatSession`].

mod client;
mod error;

pub use client::{HealthStatus, TutorClient, CHAT_PATH, HEALTH_PATH};
pub use error::ClientError;

use iterated_config::ClientConfig;
use iterated_core::SessionOptions;

/// Session options derived from the client section of the config file
pub fn session_options(config: &ClientConfig) -> SessionOptions {
    SessionOptions {
        require_answer: config.require_answer,
        model_type: config.model_type.clone(),
        api_key: config.api_key(),
    }
}
