//! Loopback port probing.
//!
//! The probe binds and immediately releases each candidate, so another process can still
//! take the port before [`crate::server::FileServer`] binds it for real. The server reports
//! that case as [`crate::error::ServerError::ListenerBind`] and the caller may retry.

use crate::{DEFAULT_BASE_PORT, DEFAULT_PORT_WINDOW, LOOPBACK_ADDRESS};

use std::net::TcpListener;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// A contiguous range of candidate ports, scanned from `base` upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortWindow {
    pub base: u16,
    pub count: u16,
}

impl PortWindow {
    pub const fn new(base: u16, count: u16) -> Self {
        Self { base, count }
    }

    /// Candidate ports in scan order. Clamped at `u16::MAX`.
    pub fn candidates(&self) -> impl Iterator<Item = u16> + use<> {
        let end = u32::from(self.base) + u32::from(self.count);
        let end = end.min(u32::from(u16::MAX) + 1);
        (u32::from(self.base)..end).filter_map(|p| u16::try_from(p).ok())
    }

    /// First port in the window that is free on the loopback interface.
    pub fn find_free_port(&self) -> Option<u16> {
        let found = self.candidates().find(|&port| !is_port_in_use(port));

        match found {
            Some(port) => debug!("Found free port {port} in window {}+{}", self.base, self.count),
            None => debug!("No free port in window {}+{}", self.base, self.count),
        }

        found
    }
}

impl Default for PortWindow {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_PORT, DEFAULT_PORT_WINDOW)
    }
}

/// Scan the default window starting at [`DEFAULT_BASE_PORT`].
pub fn find_free_port() -> Option<u16> {
    PortWindow::default().find_free_port()
}

/// Returns `true` when a loopback listener cannot be bound on `port`.
pub fn is_port_in_use(port: u16) -> bool {
    match TcpListener::bind((LOOPBACK_ADDRESS, port)) {
        Ok(listener) => {
            drop(listener);
            false
        }
        Err(e) => {
            trace!("Port {port} unavailable: {e}");
            true
        }
    }
}
