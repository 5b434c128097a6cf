//! Handle to a running accept loop.

use std::thread::JoinHandle;

use log::{debug, error};
use tokio_util::sync::CancellationToken;

/// Listener port, worker thread and cancellation token of one listening session.
///
/// The listener itself lives on the worker and is dropped when the accept loop exits.
pub(crate) struct ServerSession {
    pub(crate) port: u16,
    pub(crate) cancel: CancellationToken,
    pub(crate) worker: JoinHandle<()>,
}

impl ServerSession {
    /// Cancel the accept loop and wait for the worker to exit.
    ///
    /// A request already being handled (including an export) runs to completion first.
    pub(crate) fn shutdown(self) {
        debug!("Cancelling file server worker on port {}", self.port);
        self.cancel.cancel();

        if self.worker.join().is_err() {
            error!("File server worker on port {} panicked", self.port);
        }
    }
}
