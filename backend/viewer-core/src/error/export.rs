use common::ErrorLocation;

use std::io::Error as IoError;
use std::path::PathBuf;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ExportError {
    #[error("Export Error: {message} {location}")]
    NoPort {
        message: String,
        location: ErrorLocation,
    },

    #[error("Export Directory Error: {path}: {source} {location}")]
    Directory {
        path: PathBuf,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },

    #[error("Export Bridge Error: {message} {location}")]
    Bridge {
        message: String,
        location: ErrorLocation,
    },

    #[error("Export Persist Error: {path}: {source} {location}")]
    Persist {
        path: PathBuf,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },
}
