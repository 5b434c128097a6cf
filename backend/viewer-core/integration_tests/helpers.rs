//! Test helpers for file server integration tests.
//!
//! This module provides:
//! - An export bridge that counts exports and can be switched to fail or stall
//! - A started server bound to a private port window under a temp directory
//! - HTTP helpers for the poll endpoint

use viewer_core::change_tracker::ChangeTracker;
use viewer_core::error::ExportError;
use viewer_core::export::{ArtifactLayout, ExportBridge};
use viewer_core::identity::{IdentityProvider, StaticIdentity};
use viewer_core::port::PortWindow;
use viewer_core::server::FileServer;

use common::ErrorLocation;

use std::fs::write;
use std::net::TcpListener;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::sleep;
use std::time::Duration;

use tempfile::TempDir;

/// Export bridge that writes `snapshot <n>` and counts successful exports.
#[derive(Default)]
pub struct CountingBridge {
    exports: AtomicUsize,
    failing: AtomicBool,
    delay: Duration,
}

impl CountingBridge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Each export sleeps for `delay` before writing.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Self::default()
        })
    }

    pub fn count(&self) -> usize {
        self.exports.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl ExportBridge for CountingBridge {
    fn export(&self, target: &Path) -> Result<(), ExportError> {
        sleep(self.delay);

        if self.failing.load(Ordering::SeqCst) {
            return Err(ExportError::Bridge {
                message: String::from("simulated export failure"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let n = self.exports.fetch_add(1, Ordering::SeqCst) + 1;
        write(target, format!("snapshot {n}")).map_err(|e| ExportError::Bridge {
            message: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

/// A window of 16 ports starting at a port the OS just handed out.
pub fn ephemeral_window() -> PortWindow {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    PortWindow::new(port, 16)
}

/// A running server plus the pieces a test needs to drive it.
pub struct TestServer {
    pub server: FileServer,
    pub bridge: Arc<CountingBridge>,
    pub tracker: ChangeTracker,
    pub port: u16,
    pub base_dir: PathBuf,
    pub root: TempDir,
}

impl TestServer {
    pub fn url(&self, path_and_query: &str) -> String {
        url(self.port, path_and_query)
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.server.layout().artifact_path(self.port)
    }
}

pub fn build_test_server(
    bridge: Arc<CountingBridge>,
    identity: Option<Arc<dyn IdentityProvider>>,
    window: PortWindow,
) -> (FileServer, ChangeTracker, TempDir, PathBuf) {
    let root = TempDir::new().expect("temp dir");
    let base_dir = root.path().join("resources");
    let tracker = ChangeTracker::new();

    let server = FileServer::builder()
        .with_tracker(tracker.clone())
        .with_bridge(bridge)
        .with_layout(ArtifactLayout::in_dir(&base_dir))
        .with_identity(identity.unwrap_or_else(|| Arc::new(StaticIdentity(None))))
        .with_port_window(window)
        .build()
        .expect("Failed to build file server");

    (server, tracker, root, base_dir)
}

/// Start a server with a fresh [`CountingBridge`] and no identity.
pub fn start_test_server() -> TestServer {
    start_test_server_with(CountingBridge::new(), None)
}

pub fn start_test_server_with(
    bridge: Arc<CountingBridge>,
    identity: Option<Arc<dyn IdentityProvider>>,
) -> TestServer {
    let (mut server, tracker, root, base_dir) =
        build_test_server(Arc::clone(&bridge), identity, ephemeral_window());
    let port = server.start().expect("Failed to start file server");

    TestServer {
        server,
        bridge,
        tracker,
        port,
        base_dir,
        root,
    }
}

pub fn url(port: u16, path_and_query: &str) -> String {
    format!("http://127.0.0.1:{port}{path_and_query}")
}

/// GET the change-poll endpoint and return its body.
pub async fn poll(port: u16, force: bool) -> String {
    let path = if force {
        "/api/has-changed?force"
    } else {
        "/api/has-changed"
    };

    let response = reqwest::get(url(port, path))
        .await
        .expect("poll request failed");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    response.text().await.expect("poll body")
}
