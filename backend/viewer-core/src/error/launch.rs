use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum LaunchError {
    #[error("Invalid URL Error: {message} {location}")]
    InvalidUrl {
        message: String,
        location: ErrorLocation,
    },

    #[error("Launch Error: {message} {location}")]
    AllAttemptsFailed {
        attempts: usize,
        message: String,
        location: ErrorLocation,
    },
}
