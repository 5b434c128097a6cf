use crate::helpers::{CountingBridge, poll, start_test_server, start_test_server_with};

use std::fs::read_to_string;
use std::time::Duration;

use tokio::task::spawn_blocking;
use tokio::time::sleep;

/// **VALUE**: Verifies polling without a change is side-effect free and repeatable.
///
/// **WHY THIS MATTERS**: The client polls continuously; every poll that re-exported would
/// serialize the whole document for nothing.
///
/// **BUG THIS CATCHES**: Would catch exporting on every poll or answering `true` by default.
#[tokio::test]
async fn given_no_change_when_polled_twice_then_false_both_times_without_export() {
    // GIVEN
    let test = start_test_server();

    // WHEN
    let first = poll(test.port, false).await;
    let second = poll(test.port, false).await;

    // THEN
    assert_eq!(first, "false");
    assert_eq!(second, "false");
    assert_eq!(test.bridge.count(), 0);
}

/// **VALUE**: Verifies a change is reported once, re-exported, and then cleared.
///
/// **BUG THIS CATCHES**: Would catch a flag that is never reset (endless re-exports) or a
/// response computed after the reset (`false` on the poll that exported).
#[tokio::test]
async fn given_change_when_polled_then_true_once_and_artifact_reexported() {
    // GIVEN
    let test = start_test_server();
    test.tracker.mark_changed();

    // WHEN
    let first = poll(test.port, false).await;
    let second = poll(test.port, false).await;

    // THEN
    assert_eq!(first, "true");
    assert_eq!(second, "false");
    assert_eq!(test.bridge.count(), 1);
    assert!(!test.tracker.currently_changed());
    assert_eq!(
        read_to_string(test.artifact_path()).expect("artifact"),
        "snapshot 1"
    );
}

/// **VALUE**: Verifies `force` always answers `true` and exports, even with no change.
///
/// **WHY THIS MATTERS**: The client forces an export on first load so it never renders a
/// snapshot from an earlier session.
///
/// **BUG THIS CATCHES**: Would catch `force` being ignored when the flag is clear, or a
/// forced poll clearing a change it did not observe.
#[tokio::test]
async fn given_force_when_polled_then_true_and_exports_every_time() {
    // GIVEN
    let test = start_test_server();

    // WHEN
    let first = poll(test.port, true).await;
    let second = poll(test.port, true).await;

    // THEN
    assert_eq!(first, "true");
    assert_eq!(second, "true");
    assert_eq!(test.bridge.count(), 2);
    assert_eq!(poll(test.port, false).await, "false");
}

/// **VALUE**: Verifies a forced poll that coincides with a real change also clears it.
#[tokio::test]
async fn given_change_when_force_polled_then_flag_reset() {
    // GIVEN
    let test = start_test_server();
    test.tracker.mark_changed();

    // WHEN
    let forced = poll(test.port, true).await;

    // THEN
    assert_eq!(forced, "true");
    assert!(!test.tracker.currently_changed());
    assert_eq!(poll(test.port, false).await, "false");
}

/// **VALUE**: Verifies a failed export keeps the change pending for the next poll.
///
/// **WHY THIS MATTERS**: The export can fail transiently (document locked, disk full).
/// Clearing the flag anyway would leave the viewer stale until the next edit.
///
/// **BUG THIS CATCHES**: Would catch resetting the flag before checking the export result.
#[tokio::test]
async fn given_failing_export_when_polled_then_change_retried_on_next_poll() {
    // GIVEN: A change and a bridge that currently fails
    let test = start_test_server();
    test.tracker.mark_changed();
    test.bridge.set_failing(true);

    // WHEN: Polling while the bridge fails
    let failed = poll(test.port, false).await;

    // THEN: The client is told about the change, and it stays pending
    assert_eq!(failed, "true");
    assert!(test.tracker.currently_changed());
    assert!(!test.artifact_path().exists());

    // WHEN: The bridge recovers
    test.bridge.set_failing(false);
    let retried = poll(test.port, false).await;

    // THEN: The retry exports and clears
    assert_eq!(retried, "true");
    assert_eq!(test.bridge.count(), 1);
    assert_eq!(poll(test.port, false).await, "false");
}

/// **VALUE**: Verifies a change raised while an export runs is reported by the next poll.
///
/// **WHY THIS MATTERS**: This is the lost-update race between the host's change events
/// and the poll handler's reset. Losing it leaves the viewer showing an old model.
///
/// **BUG THIS CATCHES**: Would catch the handler reading the flag, exporting, and resetting
/// without holding the lock the host's `mark_changed` takes.
#[tokio::test]
async fn given_change_during_export_when_polled_again_then_change_not_lost() {
    // GIVEN: A slow export and a pending change
    let test = start_test_server_with(CountingBridge::slow(Duration::from_millis(500)), None);
    test.tracker.mark_changed();

    // WHEN: A poll starts exporting, and the host changes the document mid-export
    let port = test.port;
    let in_flight = tokio::spawn(async move { poll(port, false).await });
    sleep(Duration::from_millis(150)).await;

    let tracker = test.tracker.clone();
    spawn_blocking(move || tracker.mark_changed())
        .await
        .expect("mark_changed task");

    // THEN: The in-flight poll reported the first change
    assert_eq!(in_flight.await.expect("poll task"), "true");

    // THEN: The mid-export change is still pending and the next poll reports it
    assert!(test.tracker.currently_changed());
    assert_eq!(poll(test.port, false).await, "true");
    assert_eq!(test.bridge.count(), 2);
}
