//! Shared primitives for the snapshot viewer workspace.
//!
//! Every error type in `viewer-core` and `viewer-host` embeds an
//! [`ErrorLocation`] so a log line points at the exact call site that failed.

pub mod error;

pub use error::error_location::ErrorLocation;

#[cfg(test)]
mod tests;
