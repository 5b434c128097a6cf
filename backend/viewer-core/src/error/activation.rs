use crate::error::launch::LaunchError;
use crate::error::server::ServerError;

use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ActivationError {
    #[error("Connectivity Error: {message} {location}")]
    Connectivity {
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error(transparent)]
    Launch(#[from] LaunchError),
}
