use common::ErrorLocation;

use std::error::Error as StdError;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ServerError {
    #[error("Port Exhausted Error: {message} {location}")]
    PortExhausted {
        message: String,
        location: ErrorLocation,
    },

    #[error("Listener Bind Error: {message} {location}")]
    ListenerBind {
        port: u16,
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Runtime Error: {message} {location}")]
    Runtime {
        message: String,
        location: ErrorLocation,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Worker Error: {message} {location}")]
    Worker {
        message: String,
        location: ErrorLocation,
    },

    #[error("Validation Error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid State Error: {message} {location}")]
    InvalidState {
        message: String,
        location: ErrorLocation,
    },
}
