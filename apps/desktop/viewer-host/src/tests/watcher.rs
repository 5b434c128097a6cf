use crate::watcher::is_document_event;

use std::ffi::OsStr;
use std::path::PathBuf;

use notify::event::{AccessKind, AccessMode, CreateKind, DataChange, ModifyKind, RemoveKind};
use notify::{Event, EventKind};

fn event(kind: EventKind, path: &str) -> Event {
    Event::new(kind).add_path(PathBuf::from(path))
}

/// **VALUE**: Verifies writes, creations, renames, and removals of the document count.
///
/// **WHY THIS MATTERS**: Editors save in different ways (in place, write-then-rename,
/// delete-then-create); each must mark the document changed.
#[test]
fn given_content_events_for_document_when_filtered_then_relevant() {
    let name = OsStr::new("model.3dm");

    for kind in [
        EventKind::Create(CreateKind::File),
        EventKind::Modify(ModifyKind::Data(DataChange::Content)),
        EventKind::Modify(ModifyKind::Any),
        EventKind::Remove(RemoveKind::File),
        EventKind::Access(AccessKind::Close(AccessMode::Write)),
    ] {
        assert!(
            is_document_event(&event(kind, "/work/model.3dm"), name),
            "{kind:?} should count"
        );
    }
}

/// **VALUE**: Verifies reads and events for sibling files are ignored.
///
/// **BUG THIS CATCHES**: Would catch the server's own reads, or edits to other files in the
/// same directory, triggering endless re-exports.
#[test]
fn given_unrelated_events_when_filtered_then_ignored() {
    let name = OsStr::new("model.3dm");

    assert!(!is_document_event(
        &event(EventKind::Access(AccessKind::Open(AccessMode::Read)), "/work/model.3dm"),
        name
    ));
    assert!(!is_document_event(
        &event(EventKind::Access(AccessKind::Close(AccessMode::Read)), "/work/model.3dm"),
        name
    ));
    assert!(!is_document_event(
        &event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            "/work/notes.txt"
        ),
        name
    ));
}
