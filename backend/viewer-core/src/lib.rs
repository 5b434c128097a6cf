//! Embedded loopback file server for the snapshot viewer.
//!
//! The host application owns a [`server::FileServer`], feeds document changes into a
//! [`change_tracker::ChangeTracker`], and supplies an [`export::ExportBridge`] that knows how
//! to serialize its document. The web client polls `/api/has-changed` and downloads the
//! exported artifact from the same server.

pub mod activation;
pub mod change_tracker;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod export;
pub mod identity;
pub mod launcher;
pub mod port;
pub mod server;

#[cfg(test)]
mod tests;

pub const LOOPBACK_ADDRESS: &str = "127.0.0.1";
pub const SERVER_HOSTNAME: &str = "localhost";
pub const SERVER_BASE_URL: &str = const_format::concatcp!("http://", SERVER_HOSTNAME);
pub const DEFAULT_BASE_PORT: u16 = 8469;
pub const DEFAULT_PORT_WINDOW: u16 = 30;
