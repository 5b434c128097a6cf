//! Embedded loopback file server.
//!
//! One [`FileServer`] owns at most one listening session. The session runs a
//! single-threaded tokio runtime on a dedicated thread and serves requests one at a time:
//!
//! | Method | Path | Behavior |
//! |---|---|---|
//! | `OPTIONS` | any | 204 with CORS headers |
//! | any | `/api/has-changed[?force]` | re-export if changed or forced, body `true`/`false` |
//! | any | `/who_am_i` | identity token as text |
//! | `GET` | `/<file>` | file from the artifact directory, or 404 |
//!
//! # Lifecycle
//!
//! `Idle → Starting → Listening → Stopping → Idle`. [`FileServer::start`] is a no-op while
//! listening and [`FileServer::stop`] is a no-op while idle. The chosen port survives
//! restarts until [`FileServer::clear_port`] is called or a restart finds it taken.

mod context;
mod router;
mod session;
mod worker;

pub use router::{
    FORCE_QUERY_KEY, HAS_CHANGED_PATH, WHO_AM_I_PATH, has_force_flag, request_file_name,
};

use crate::change_tracker::ChangeTracker;
use crate::error::export::ExportError;
use crate::error::server::ServerError;
use crate::export::{ArtifactExporter, ArtifactLayout, ExportBridge};
use crate::identity::{IdentityProvider, StaticIdentity};
use crate::port::PortWindow;
use crate::{LOOPBACK_ADDRESS, SERVER_BASE_URL};

use context::ServerContext;
use session::ServerSession;

use common::ErrorLocation;

use std::net::TcpListener as StdTcpListener;
use std::panic::Location;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::Builder as ThreadBuilder;

use log::{debug, error, info};
use tokio::runtime::Builder as RuntimeBuilder;
use tokio_util::sync::CancellationToken;

const WORKER_THREAD_PREFIX: &str = "file-server";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Idle,
    Starting,
    Listening,
    Stopping,
}

/// Loopback HTTP server for the exported snapshot.
pub struct FileServer {
    context: Arc<ServerContext>,
    window: PortWindow,
    state: ServerState,
    session: Option<ServerSession>,
}

impl FileServer {
    pub fn builder() -> FileServerBuilder {
        FileServerBuilder::default()
    }

    /// Start listening, or return the current port if already listening.
    ///
    /// Reuses the previously chosen port, otherwise scans the port window.
    ///
    /// # Errors
    ///
    /// - [`ServerError::PortExhausted`] - no free port in the window
    /// - [`ServerError::ListenerBind`] - the port was taken before the bind. The chosen port
    ///   is forgotten, so calling `start` again rescans the window.
    /// - [`ServerError::Runtime`] / [`ServerError::Worker`] - the worker could not be started
    #[track_caller]
    pub fn start(&mut self) -> Result<u16, ServerError> {
        if let Some(session) = &self.session {
            debug!("File server already listening on port {}", session.port);
            return Ok(session.port);
        }

        self.state = ServerState::Starting;

        match self.open_session() {
            Ok(session) => {
                let port = session.port;
                self.session = Some(session);
                self.state = ServerState::Listening;
                info!("Started file server on {SERVER_BASE_URL}:{port}");
                Ok(port)
            }
            Err(e) => {
                self.state = ServerState::Idle;
                error!("Failed to start file server: {e}");
                Err(e)
            }
        }
    }

    /// Stop listening and join the worker. No-op when idle.
    pub fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            debug!("File server not running, nothing to stop");
            return;
        };

        self.state = ServerState::Stopping;
        let port = session.port;
        session.shutdown();
        self.state = ServerState::Idle;

        info!("Stopped file server on port {port}");
    }

    /// Forget the sticky port so the next start rescans the window.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidState`] while listening.
    #[track_caller]
    pub fn clear_port(&mut self) -> Result<(), ServerError> {
        if self.session.is_some() {
            return Err(ServerError::InvalidState {
                message: String::from("Cannot clear the port while the server is listening"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.context.set_chosen_port(None);
        Ok(())
    }

    /// Export the artifact for the chosen port now and clear the change flag.
    #[track_caller]
    pub fn export_now(&self) -> Result<PathBuf, ExportError> {
        self.context.export_now()
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == ServerState::Listening
    }

    pub fn chosen_port(&self) -> Option<u16> {
        self.context.chosen_port()
    }

    /// `http://localhost:<port>` once a port has been chosen.
    pub fn base_url(&self) -> Option<String> {
        self.chosen_port()
            .map(|port| format!("{SERVER_BASE_URL}:{port}"))
    }

    pub fn tracker(&self) -> &ChangeTracker {
        &self.context.tracker
    }

    pub fn layout(&self) -> &ArtifactLayout {
        self.context.exporter.layout()
    }

    pub fn port_window(&self) -> PortWindow {
        self.window
    }

    #[track_caller]
    fn open_session(&mut self) -> Result<ServerSession, ServerError> {
        let port = match self.context.chosen_port() {
            Some(port) => port,
            None => {
                let port = self.window.find_free_port().ok_or_else(|| {
                    ServerError::PortExhausted {
                        message: format!(
                            "No free ports available in {}..{}",
                            self.window.base,
                            u32::from(self.window.base) + u32::from(self.window.count)
                        ),
                        location: ErrorLocation::from(Location::caller()),
                    }
                })?;
                self.context.set_chosen_port(Some(port));
                port
            }
        };

        let bind_error = |e: std::io::Error| ServerError::ListenerBind {
            port,
            message: format!("Failed to bind {LOOPBACK_ADDRESS}:{port}: {e}"),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(e),
        };

        // A port someone else now holds cannot reach the open client either, so forget it
        // and let the next start rescan the window.
        let listener = StdTcpListener::bind((LOOPBACK_ADDRESS, port)).map_err(|e| {
            self.context.set_chosen_port(None);
            bind_error(e)
        })?;
        listener.set_nonblocking(true).map_err(bind_error)?;

        let runtime = RuntimeBuilder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ServerError::Runtime {
                message: format!("Failed to build server runtime: {e}"),
                location: ErrorLocation::from(Location::caller()),
                source: Box::new(e),
            })?;

        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();
        let worker_context = Arc::clone(&self.context);

        let worker = ThreadBuilder::new()
            .name(format!("{WORKER_THREAD_PREFIX}-{port}"))
            .spawn(move || {
                runtime.block_on(worker::accept_loop(listener, worker_context, worker_cancel));
            })
            .map_err(|e| ServerError::Worker {
                message: format!("Failed to spawn server thread: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(ServerSession {
            port,
            cancel,
            worker,
        })
    }
}

impl Drop for FileServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Builder for [`FileServer`].
///
/// The export bridge and artifact layout are required; the change tracker, identity and
/// port window default to a fresh tracker, no identity, and `8469..8499`.
#[derive(Default)]
pub struct FileServerBuilder {
    tracker: Option<ChangeTracker>,
    bridge: Option<Arc<dyn ExportBridge>>,
    layout: Option<ArtifactLayout>,
    identity: Option<Arc<dyn IdentityProvider>>,
    window: Option<PortWindow>,
}

impl FileServerBuilder {
    pub fn with_tracker(mut self, tracker: ChangeTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn with_bridge(mut self, bridge: Arc<dyn ExportBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    pub fn with_layout(mut self, layout: ArtifactLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_port_window(mut self, window: PortWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Build the server with validation.
    #[track_caller]
    pub fn build(self) -> Result<FileServer, ServerError> {
        let bridge = self.bridge.ok_or_else(|| ServerError::Validation {
            message: String::from("Export bridge is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let layout = self.layout.ok_or_else(|| ServerError::Validation {
            message: String::from("Artifact layout is required"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let window = self.window.unwrap_or_default();
        if window.count == 0 {
            return Err(ServerError::Validation {
                message: String::from("Port window cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let tracker = self.tracker.unwrap_or_default();
        let identity = self
            .identity
            .unwrap_or_else(|| Arc::new(StaticIdentity::default()));
        let exporter = ArtifactExporter::new(layout, bridge);

        Ok(FileServer {
            context: Arc::new(ServerContext::new(tracker, exporter, identity)),
            window,
            state: ServerState::Idle,
            session: None,
        })
    }
}
