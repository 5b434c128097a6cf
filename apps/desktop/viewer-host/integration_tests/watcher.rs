use viewer_host::error::HostError;
use viewer_host::watcher::watch_document;

use viewer_core::change_tracker::ChangeTracker;

use std::fs::{canonicalize, write};
use std::thread::sleep;
use std::time::{Duration, Instant};

use tempfile::TempDir;

fn wait_for(condition: impl Fn() -> bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        sleep(Duration::from_millis(25));
    }
    condition()
}

/// **VALUE**: Verifies saving the source document marks the tracker changed.
///
/// **WHY THIS MATTERS**: This is the harness's change feed; without it the web client
/// never sees edits.
///
/// **BUG THIS CATCHES**: Would catch watching the wrong directory or filtering out the
/// document's own events.
#[test]
fn given_watched_document_when_written_then_tracker_marked() {
    // GIVEN
    let dir = TempDir::new().expect("temp dir");
    let document = dir.path().join("model.3dm");
    write(&document, b"v1").expect("write");

    let tracker = ChangeTracker::new();
    let watcher = watch_document(&document, tracker.on_host_change()).expect("watch");
    assert_eq!(watcher.document(), canonicalize(&document).expect("canonical"));

    // WHEN
    write(&document, b"v2").expect("rewrite");

    // THEN
    assert!(
        wait_for(|| tracker.currently_changed(), Duration::from_secs(5)),
        "Write should mark the document changed"
    );
}

/// **VALUE**: Verifies writes to other files in the directory are ignored.
#[test]
fn given_watched_document_when_sibling_written_then_tracker_untouched() {
    // GIVEN
    let dir = TempDir::new().expect("temp dir");
    let document = dir.path().join("model.3dm");
    write(&document, b"v1").expect("write");

    let tracker = ChangeTracker::new();
    let _watcher = watch_document(&document, tracker.on_host_change()).expect("watch");

    // WHEN
    write(dir.path().join("notes.txt"), b"unrelated").expect("write sibling");

    // THEN
    assert!(!wait_for(|| tracker.currently_changed(), Duration::from_millis(500)));
}

/// **VALUE**: Verifies a missing document is a `Watch` error, not a panic.
#[test]
fn given_missing_document_when_watching_then_watch_error() {
    let dir = TempDir::new().expect("temp dir");

    let result = watch_document(&dir.path().join("missing.3dm"), || {});

    assert!(matches!(result, Err(HostError::Watch { .. })));
}
