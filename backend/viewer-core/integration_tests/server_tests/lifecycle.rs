use crate::helpers::{CountingBridge, build_test_server, ephemeral_window, poll, start_test_server, url};

use viewer_core::error::{ExportError, ServerError};
use viewer_core::export::ArtifactLayout;
use viewer_core::port::{PortWindow, is_port_in_use};
use viewer_core::server::{FileServer, ServerState};

use std::net::TcpListener;

/// **VALUE**: Verifies a second `start` reuses the running session.
///
/// **WHY THIS MATTERS**: Every activation calls `start`; a second listener on a new port
/// would leave the already-open client polling a server nobody updates.
///
/// **BUG THIS CATCHES**: Would catch `start` spawning a new worker while one is listening.
#[tokio::test]
async fn given_listening_server_when_started_again_then_same_port() {
    // GIVEN
    let mut test = start_test_server();

    // WHEN
    let again = test.server.start().expect("second start");

    // THEN
    assert_eq!(again, test.port);
    assert_eq!(test.server.state(), ServerState::Listening);
    assert!(test.server.is_listening());
    assert_eq!(poll(test.port, false).await, "false");
}

/// **VALUE**: Verifies `stop` on an idle server is a harmless no-op, any number of times.
#[test]
fn given_idle_server_when_stopped_then_noop() {
    // GIVEN
    let (mut server, _tracker, _root, _base_dir) =
        build_test_server(CountingBridge::new(), None, ephemeral_window());

    // WHEN
    server.stop();
    server.stop();

    // THEN
    assert_eq!(server.state(), ServerState::Idle);
    assert_eq!(server.chosen_port(), None);
}

/// **VALUE**: Verifies `stop` closes the listener and joins the worker before returning.
///
/// **WHY THIS MATTERS**: A worker that outlives `stop` keeps the port bound, so the next
/// activation would scan past it and the client would be sent to a different port.
///
/// **BUG THIS CATCHES**: Would catch a detached worker thread or a leaked listener.
#[tokio::test]
async fn given_listening_server_when_stopped_then_port_released() {
    // GIVEN
    let mut test = start_test_server();
    assert!(is_port_in_use(test.port));

    // WHEN
    test.server.stop();

    // THEN
    assert_eq!(test.server.state(), ServerState::Idle);
    assert!(!is_port_in_use(test.port), "Port should be free after stop");
    assert!(reqwest::get(url(test.port, "/who_am_i")).await.is_err());

    test.server.stop();
}

/// **VALUE**: Verifies start → stop → start serves again on the same port.
///
/// **WHY THIS MATTERS**: The chosen port is sticky for the session; a client launched with
/// `?p=<port>` must find the server there after the host restarts it.
#[tokio::test]
async fn given_stopped_server_when_restarted_then_reuses_port() {
    // GIVEN
    let mut test = start_test_server();
    test.server.stop();

    // WHEN
    let restarted = test.server.start().expect("restart");

    // THEN
    assert_eq!(restarted, test.port);
    assert_eq!(test.server.chosen_port(), Some(test.port));
    test.tracker.mark_changed();
    assert_eq!(poll(test.port, false).await, "true");
}

/// **VALUE**: Verifies the sticky port can only be cleared while idle.
///
/// **BUG THIS CATCHES**: Would catch clearing the port out from under a running worker,
/// which would make `has-changed` skip exports.
#[test]
fn given_listening_server_when_clearing_port_then_invalid_state() {
    // GIVEN
    let mut test = start_test_server();

    // WHEN / THEN: Refused while listening
    assert!(matches!(
        test.server.clear_port(),
        Err(ServerError::InvalidState { .. })
    ));
    assert_eq!(test.server.chosen_port(), Some(test.port));

    // WHEN / THEN: Allowed once stopped
    test.server.stop();
    test.server.clear_port().expect("clear when idle");
    assert_eq!(test.server.chosen_port(), None);
    assert_eq!(test.server.base_url(), None);
}

/// **VALUE**: Verifies a full window is reported as `PortExhausted` and leaves the server idle.
///
/// **WHY THIS MATTERS**: Exhaustion must be a reportable error for the activation, never a
/// panic or a half-started server.
#[test]
fn given_saturated_window_when_starting_then_port_exhausted() {
    // GIVEN: The only candidate is taken
    let holder = TcpListener::bind(("127.0.0.1", 0)).expect("bind");
    let port = holder.local_addr().expect("addr").port();
    let (mut server, _tracker, _root, _base_dir) =
        build_test_server(CountingBridge::new(), None, PortWindow::new(port, 1));

    // WHEN
    let result = server.start();

    // THEN
    assert!(matches!(result, Err(ServerError::PortExhausted { .. })));
    assert_eq!(server.state(), ServerState::Idle);
    assert_eq!(server.chosen_port(), None);
}

/// **VALUE**: Verifies a restart whose sticky port was taken fails once and then recovers on
/// another port from the window.
///
/// **WHY THIS MATTERS**: Another process can grab the port while the viewer is closed.
/// Retrying the activation must rescan the window instead of binding the taken port forever.
///
/// **BUG THIS CATCHES**: Would catch `ListenerBind` leaving the taken port chosen, so every
/// retry fails even though the window still has free ports.
#[tokio::test]
async fn given_sticky_port_taken_when_restarting_then_next_start_rescans() {
    // GIVEN: A stopped server whose chosen port is now held elsewhere
    let mut test = start_test_server();
    test.server.stop();
    let squatter = TcpListener::bind(("127.0.0.1", test.port)).expect("take chosen port");

    // WHEN: First restart hits the taken port
    let first = test.server.start();

    // THEN: Bind error, idle, port forgotten
    match first {
        Err(ServerError::ListenerBind { port, .. }) => assert_eq!(port, test.port),
        other => panic!("Expected ListenerBind, got {other:?}"),
    }
    assert_eq!(test.server.state(), ServerState::Idle);
    assert_eq!(test.server.chosen_port(), None);

    // WHEN: Retry
    let retried = test.server.start().expect("retry rescans the window");

    // THEN: A different port in the window that actually serves
    assert_ne!(retried, test.port);
    assert!(test.server.port_window().candidates().any(|p| p == retried));
    assert_eq!(test.server.chosen_port(), Some(retried));
    assert_eq!(poll(retried, false).await, "false");

    drop(squatter);
}

/// **VALUE**: Verifies an explicit export before any port is chosen fails cleanly.
#[test]
fn given_unstarted_server_when_exporting_then_no_port_error() {
    // GIVEN
    let (server, _tracker, _root, _base_dir) =
        build_test_server(CountingBridge::new(), None, ephemeral_window());

    // WHEN / THEN
    assert!(matches!(
        server.export_now(),
        Err(ExportError::NoPort { .. })
    ));
}

/// **VALUE**: Verifies `export_now` writes the port's artifact and clears a pending change.
#[test]
fn given_started_server_with_change_when_exporting_now_then_flag_cleared() {
    // GIVEN
    let test = start_test_server();
    test.tracker.mark_changed();

    // WHEN
    let path = test.server.export_now().expect("export");

    // THEN
    assert_eq!(path, test.artifact_path());
    assert!(path.exists());
    assert!(!test.tracker.currently_changed());
    assert_eq!(test.bridge.count(), 1);
}

/// **VALUE**: Verifies dropping the server stops it.
///
/// **BUG THIS CATCHES**: Would catch a host that forgets `stop` leaking a bound port.
#[test]
fn given_listening_server_when_dropped_then_port_released() {
    // GIVEN
    let test = start_test_server();
    let port = test.port;

    // WHEN
    drop(test);

    // THEN
    assert!(!is_port_in_use(port));
}

/// **VALUE**: Verifies the builder rejects missing collaborators and empty windows.
#[test]
fn given_incomplete_builder_when_building_then_validation_error() {
    let missing_bridge = FileServer::builder()
        .with_layout(ArtifactLayout::in_dir("/tmp/unused"))
        .build();
    assert!(matches!(missing_bridge, Err(ServerError::Validation { .. })));

    let missing_layout = FileServer::builder()
        .with_bridge(CountingBridge::new())
        .build();
    assert!(matches!(missing_layout, Err(ServerError::Validation { .. })));

    let empty_window = FileServer::builder()
        .with_bridge(CountingBridge::new())
        .with_layout(ArtifactLayout::in_dir("/tmp/unused"))
        .with_port_window(PortWindow::new(8469, 0))
        .build();
    assert!(matches!(empty_window, Err(ServerError::Validation { .. })));
}
