use common::ErrorLocation;

use std::io::Error as IoError;
use std::path::PathBuf;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("Config Read Error: {path}: {source} {location}")]
    ReadError {
        path: PathBuf,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },

    #[error("Config Parse Error: {path}: {reason} {location}")]
    ParseError {
        path: PathBuf,
        reason: String,
        location: ErrorLocation,
    },

    #[error("Config Write Error: {path}: {source} {location}")]
    WriteError {
        path: PathBuf,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },

    #[error("Config Directory Unavailable Error: {reason} {location}")]
    DirectoryUnavailable {
        reason: String,
        location: ErrorLocation,
    },

    #[error("Config Serialization Error: {reason} {location}")]
    SerializeError {
        reason: String,
        location: ErrorLocation,
    },

    #[error("Config Validation Error: {reason} {location}")]
    ValidationError {
        reason: String,
        location: ErrorLocation,
    },
}
