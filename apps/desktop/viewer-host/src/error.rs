use common::ErrorLocation;

use std::panic::Location;

use serde::Serialize;
use thiserror::Error;
use viewer_core::error::{ActivationError, ConfigError, CoreError};

/// Errors raised by the host harness.
///
/// Core errors are flattened to their display text so the whole enum stays serializable
/// for structured log output.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum HostError {
    /// Error from this app (logger, directories, runtime setup)
    #[error("Host Error: {message} {location}")]
    Host {
        message: String,
        location: ErrorLocation,
    },

    /// Error from viewer-core operations (server, export, activation)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },

    /// Config could not be loaded or saved
    #[error("Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },

    /// The document watcher could not be set up
    #[error("Watch Error: {message} {location}")]
    Watch {
        message: String,
        location: ErrorLocation,
    },
}

impl From<CoreError> for HostError {
    #[track_caller]
    fn from(e: CoreError) -> Self {
        HostError::Core {
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ActivationError> for HostError {
    #[track_caller]
    fn from(e: ActivationError) -> Self {
        HostError::Core {
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for HostError {
    #[track_caller]
    fn from(e: ConfigError) -> Self {
        HostError::Config {
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<notify::Error> for HostError {
    #[track_caller]
    fn from(e: notify::Error) -> Self {
        HostError::Watch {
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
