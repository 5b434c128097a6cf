//! Turns file-system changes to the source document into change notifications.
//!
//! The parent directory is watched rather than the file itself: editors commonly save by
//! writing a new file and renaming it over the old one, which would orphan a watch on the
//! original inode.

use crate::error::HostError;

use common::ErrorLocation;

use std::ffi::{OsStr, OsString};
use std::fs::canonicalize;
use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{debug, error, info};
use notify::event::{AccessKind, AccessMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Keeps the watch alive. Dropping it stops notifications.
pub struct DocumentWatcher {
    document: PathBuf,
    _watcher: RecommendedWatcher,
}

impl DocumentWatcher {
    pub fn document(&self) -> &Path {
        &self.document
    }
}

/// Call `on_change` whenever `document` is written, created, replaced, or removed.
///
/// # Errors
///
/// Returns [`HostError::Watch`] if the document does not exist or the watch cannot be set up.
#[track_caller]
pub fn watch_document<F>(document: &Path, on_change: F) -> Result<DocumentWatcher, HostError>
where
    F: Fn() + Send + 'static,
{
    let document = canonicalize(document).map_err(|e| HostError::Watch {
        message: format!("Cannot watch {}: {e}", document.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let (Some(directory), Some(file_name)) = (document.parent(), document.file_name()) else {
        return Err(HostError::Watch {
            message: format!("{} has no parent directory", document.display()),
            location: ErrorLocation::from(Location::caller()),
        });
    };
    let file_name: OsString = file_name.to_os_string();

    let mut watcher = RecommendedWatcher::new(
        move |result: notify::Result<Event>| match result {
            Ok(event) if is_document_event(&event, &file_name) => {
                debug!("Document event {:?}", event.kind);
                on_change();
            }
            Ok(_) => {}
            Err(e) => error!("Document watch error: {e}"),
        },
        Config::default(),
    )?;

    watcher.watch(directory, RecursiveMode::NonRecursive)?;
    info!("Watching {} for changes", document.display());

    Ok(DocumentWatcher {
        document,
        _watcher: watcher,
    })
}

/// `true` for events that change the content of the file named `file_name`.
///
/// Reads, opens, and metadata-only access are ignored; a close after writing counts.
pub fn is_document_event(event: &Event, file_name: &OsStr) -> bool {
    let relevant_kind = match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => true,
        EventKind::Access(AccessKind::Close(AccessMode::Write)) => true,
        EventKind::Access(_) | EventKind::Any | EventKind::Other => false,
    };

    relevant_kind
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == Some(file_name))
}
