//! State shared between the [`FileServer`](super::FileServer) owner and its worker.

use crate::change_tracker::ChangeTracker;
use crate::error::export::ExportError;
use crate::export::ArtifactExporter;
use crate::identity::IdentityProvider;

use common::ErrorLocation;

use std::panic::Location;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

pub(crate) struct ServerContext {
    pub(crate) tracker: ChangeTracker,
    pub(crate) exporter: ArtifactExporter,
    pub(crate) identity: Arc<dyn IdentityProvider>,
    chosen_port: Mutex<Option<u16>>,
}

impl ServerContext {
    pub(crate) fn new(
        tracker: ChangeTracker,
        exporter: ArtifactExporter,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            tracker,
            exporter,
            identity,
            chosen_port: Mutex::new(None),
        }
    }

    pub(crate) fn chosen_port(&self) -> Option<u16> {
        *self
            .chosen_port
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_chosen_port(&self, port: Option<u16>) {
        *self
            .chosen_port
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = port;
    }

    /// Export under the change lock and clear the flag on success.
    #[track_caller]
    pub(crate) fn export_now(&self) -> Result<PathBuf, ExportError> {
        let mut guard = self.tracker.lock();

        let port = self.chosen_port().ok_or_else(|| ExportError::NoPort {
            message: String::from("No port chosen yet, nothing to export to"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let path = self.exporter.export(port)?;
        guard.reset_flag();
        Ok(path)
    }
}
