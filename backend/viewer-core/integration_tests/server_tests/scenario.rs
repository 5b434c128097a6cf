use crate::helpers::{CountingBridge, build_test_server, poll};

use viewer_core::port::{PortWindow, find_free_port};

use std::fs::read_to_string;

use serial_test::serial;

/// **VALUE**: Walks the whole poll protocol on the default port window.
///
/// Start on the first free port from 8469, export once, poll with no change, raise a
/// document change, poll again, and poll once more.
///
/// **WHY THIS MATTERS**: This is the sequence a real web client drives. Each step depends on
/// the previous one leaving the flag and the artifact in the right state.
///
/// **BUG THIS CATCHES**: Would catch any regression in port selection, artifact naming, the
/// pre-reset response value, or the post-export reset.
#[tokio::test]
#[serial(default_port_window)]
async fn given_default_window_when_client_polls_through_a_change_then_protocol_holds() {
    // GIVEN: A server on the default window
    let expected_port = find_free_port().expect("a free port in 8469..8499");
    let bridge = CountingBridge::new();
    let (mut server, tracker, _root, base_dir) =
        build_test_server(bridge.clone(), None, PortWindow::default());

    // WHEN: Started and exported
    let port = server.start().expect("start");
    let artifact = server.export_now().expect("initial export");

    // THEN: First free port from 8469, artifact named after it
    assert_eq!(port, expected_port);
    assert_eq!(server.base_url(), Some(format!("http://localhost:{port}")));
    assert_eq!(artifact, base_dir.join(format!("model{port}.3dm")));
    assert_eq!(read_to_string(&artifact).expect("artifact"), "snapshot 1");

    // WHEN / THEN: No change yet
    assert_eq!(poll(port, false).await, "false");
    assert_eq!(bridge.count(), 1, "No export without a change");

    // WHEN: The document changes
    tracker.on_host_change()();

    // THEN: Reported once, re-exported, and cleared
    assert_eq!(poll(port, false).await, "true");
    assert_eq!(bridge.count(), 2);
    assert_eq!(read_to_string(&artifact).expect("artifact"), "snapshot 2");
    assert!(!tracker.currently_changed());

    // THEN: Repeat poll is quiet
    assert_eq!(poll(port, false).await, "false");
    assert_eq!(bridge.count(), 2);

    server.stop();
}
