use crate::helpers::{CountingBridge, build_test_server, ephemeral_window};

use viewer_core::activation::{
    ActivationRequest, ActivationTarget, LaunchMode, MessageSeverity, OpenedView, ViewerHost,
    activate,
};
use viewer_core::connectivity::{AlwaysOnline, ConnectivityChecker};
use viewer_core::error::{ActivationError, ServerError};
use viewer_core::port::PortWindow;
use viewer_core::server::ServerState;

use std::net::TcpListener;
use std::sync::Mutex;

struct Offline;

impl ConnectivityChecker for Offline {
    async fn is_online(&self) -> bool {
        false
    }
}

/// Records everything activation asks of the host.
#[derive(Default)]
struct RecordingHost {
    browser_opens: bool,
    messages: Mutex<Vec<(MessageSeverity, String)>>,
    embedded: Mutex<Vec<String>>,
    browser: Mutex<Vec<String>>,
}

impl RecordingHost {
    fn with_browser(browser_opens: bool) -> Self {
        Self {
            browser_opens,
            ..Self::default()
        }
    }

    fn messages(&self) -> Vec<(MessageSeverity, String)> {
        self.messages.lock().expect("lock").clone()
    }

    fn embedded(&self) -> Vec<String> {
        self.embedded.lock().expect("lock").clone()
    }

    fn browser(&self) -> Vec<String> {
        self.browser.lock().expect("lock").clone()
    }
}

impl ViewerHost for RecordingHost {
    fn show_message(&self, severity: MessageSeverity, title: &str, _body: &str) {
        self.messages
            .lock()
            .expect("lock")
            .push((severity, title.to_string()));
    }

    fn open_embedded_view(&self, url: &str) {
        self.embedded.lock().expect("lock").push(url.to_string());
    }

    fn open_in_browser(&self, url: &str) -> bool {
        self.browser.lock().expect("lock").push(url.to_string());
        self.browser_opens
    }
}

/// **VALUE**: Verifies an offline machine aborts activation before anything starts.
///
/// **WHY THIS MATTERS**: The web client is hosted online; starting the server and exporting
/// the document would be wasted work the user cannot see.
///
/// **BUG THIS CATCHES**: Would catch the connectivity result being logged and ignored.
#[tokio::test]
async fn given_offline_when_activating_then_aborts_before_server_start() {
    // GIVEN
    let bridge = CountingBridge::new();
    let (mut server, _tracker, _root, _base_dir) =
        build_test_server(bridge.clone(), None, ephemeral_window());
    let host = RecordingHost::default();
    let request = ActivationRequest::new(ActivationTarget::Viewer);

    // WHEN
    let result = activate(&mut server, &host, &Offline, &request).await;

    // THEN
    assert!(matches!(result, Err(ActivationError::Connectivity { .. })));
    assert_eq!(server.state(), ServerState::Idle);
    assert_eq!(server.chosen_port(), None);
    assert_eq!(bridge.count(), 0);
    assert_eq!(
        host.messages(),
        vec![(MessageSeverity::Warning, String::from("No Internet Connection"))]
    );
    assert!(host.embedded().is_empty());
    assert!(host.browser().is_empty());
}

/// **VALUE**: Verifies embedded mode starts, exports, and opens the embedded view.
#[tokio::test]
async fn given_embedded_mode_when_activating_then_exports_and_opens_embedded_view() {
    // GIVEN
    let bridge = CountingBridge::new();
    let (mut server, _tracker, _root, _base_dir) =
        build_test_server(bridge.clone(), None, ephemeral_window());
    let host = RecordingHost::default();
    let request = ActivationRequest::new(ActivationTarget::Playground)
        .with_launch_mode(LaunchMode::EmbeddedView);

    // WHEN
    let outcome = activate(&mut server, &host, &AlwaysOnline, &request)
        .await
        .expect("activation");

    // THEN
    let expected_url = format!(
        "https://playground.ijewel3d.com/v2/?rhino&p={}",
        outcome.port
    );
    assert_eq!(outcome.url, expected_url);
    assert_eq!(outcome.view, OpenedView::EmbeddedView);
    assert!(server.is_listening());
    assert_eq!(bridge.count(), 1);
    assert!(server.layout().artifact_path(outcome.port).exists());
    assert_eq!(host.embedded(), vec![expected_url]);
    assert!(host.browser().is_empty());
    assert!(host.messages().is_empty());
}

/// **VALUE**: Verifies browser mode hands the URL to the browser and nothing else.
#[tokio::test]
async fn given_browser_opens_when_activating_then_no_embedded_view() {
    // GIVEN
    let (mut server, _tracker, _root, _base_dir) =
        build_test_server(CountingBridge::new(), None, ephemeral_window());
    let host = RecordingHost::with_browser(true);
    let request = ActivationRequest::new(ActivationTarget::Enterprise {
        drive: Some(String::from("acme")),
    })
    .with_launch_mode(LaunchMode::ExternalBrowser);

    // WHEN
    let outcome = activate(&mut server, &host, &AlwaysOnline, &request)
        .await
        .expect("activation");

    // THEN
    assert_eq!(outcome.view, OpenedView::Browser);
    assert_eq!(
        host.browser(),
        vec![format!(
            "https://ijewel3d.com/acme/playground?rhino&p={}",
            outcome.port
        )]
    );
    assert!(host.embedded().is_empty());
}

/// **VALUE**: Verifies a browser failure is reported and falls back to the embedded view.
///
/// **WHY THIS MATTERS**: Users without a supported browser must still get a viewer, and must
/// be told which browsers would work.
#[tokio::test]
async fn given_no_browser_when_activating_then_dialog_and_embedded_fallback() {
    // GIVEN
    let (mut server, _tracker, _root, _base_dir) =
        build_test_server(CountingBridge::new(), None, ephemeral_window());
    let host = RecordingHost::with_browser(false);
    let request =
        ActivationRequest::new(ActivationTarget::Design).with_launch_mode(LaunchMode::ExternalBrowser);

    // WHEN
    let outcome = activate(&mut server, &host, &AlwaysOnline, &request)
        .await
        .expect("activation");

    // THEN
    assert_eq!(outcome.view, OpenedView::EmbeddedView);
    assert_eq!(host.browser(), vec![outcome.url.clone()]);
    assert_eq!(host.embedded(), vec![outcome.url.clone()]);
    assert_eq!(
        host.messages(),
        vec![(MessageSeverity::Error, String::from("Error Launching Browser"))]
    );
}

/// **VALUE**: Verifies a server start failure is reported to the user and returned.
#[tokio::test]
async fn given_saturated_window_when_activating_then_server_error_reported() {
    // GIVEN
    let holder = TcpListener::bind(("127.0.0.1", 0)).expect("bind");
    let port = holder.local_addr().expect("addr").port();
    let (mut server, _tracker, _root, _base_dir) =
        build_test_server(CountingBridge::new(), None, PortWindow::new(port, 1));
    let host = RecordingHost::default();
    let request = ActivationRequest::new(ActivationTarget::Viewer);

    // WHEN
    let result = activate(&mut server, &host, &AlwaysOnline, &request).await;

    // THEN
    assert!(matches!(
        result,
        Err(ActivationError::Server(ServerError::PortExhausted { .. }))
    ));
    let messages = host.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, MessageSeverity::Error);
    assert!(host.embedded().is_empty());
}

/// **VALUE**: Verifies a second activation reuses the running server and port.
///
/// **BUG THIS CATCHES**: Would catch each activation leaking a new listener.
#[tokio::test]
async fn given_active_viewer_when_activated_again_then_same_port_and_fresh_export() {
    // GIVEN
    let bridge = CountingBridge::new();
    let (mut server, _tracker, _root, _base_dir) =
        build_test_server(bridge.clone(), None, ephemeral_window());
    let host = RecordingHost::default();
    let request =
        ActivationRequest::new(ActivationTarget::Viewer).with_launch_mode(LaunchMode::EmbeddedView);

    // WHEN
    let first = activate(&mut server, &host, &AlwaysOnline, &request)
        .await
        .expect("first activation");
    let second = activate(&mut server, &host, &AlwaysOnline, &request)
        .await
        .expect("second activation");

    // THEN
    assert_eq!(first.port, second.port);
    assert_eq!(bridge.count(), 2);
    assert_eq!(host.embedded().len(), 2);
}
