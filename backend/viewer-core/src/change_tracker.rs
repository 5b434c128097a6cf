//! Document change tracking shared between the host and the file server.
//!
//! The host marks the document dirty from its event callbacks; the `/api/has-changed`
//! handler is the only place that exports and clears the flag. Both sides serialize on the
//! same lock so a change raised while an export is running is never lost: `mark_changed`
//! blocks until the export finishes and then sets the flag again for the next poll.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::trace;

/// Host document events that invalidate the exported snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEvent {
    ObjectAdded,
    ObjectDeleted,
    ObjectUndeleted,
    ObjectReplaced,
    AttributesModified,
    BeforeTransform,
    MaterialTable,
    LayerTable,
}

impl HostEvent {
    pub const ALL: [HostEvent; 8] = [
        HostEvent::ObjectAdded,
        HostEvent::ObjectDeleted,
        HostEvent::ObjectUndeleted,
        HostEvent::ObjectReplaced,
        HostEvent::AttributesModified,
        HostEvent::BeforeTransform,
        HostEvent::MaterialTable,
        HostEvent::LayerTable,
    ];
}

struct Inner {
    changed: AtomicBool,
    lock: Mutex<()>,
}

/// Cloneable handle to the "model has changed" flag and its lock.
///
/// Construct one per host integration and hand clones to the event feed and the server.
#[derive(Clone)]
pub struct ChangeTracker {
    inner: Arc<Inner>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                changed: AtomicBool::new(false),
                lock: Mutex::new(()),
            }),
        }
    }

    /// Mark the document as changed. Blocks while an export holds the lock.
    pub fn mark_changed(&self) {
        let _guard = self.acquire();
        self.inner.changed.store(true, Ordering::SeqCst);
    }

    /// Clear the flag. Must not be called while holding a [`ChangeGuard`]; use
    /// [`ChangeGuard::reset_flag`] there.
    pub fn reset_flag(&self) {
        let _guard = self.acquire();
        self.inner.changed.store(false, Ordering::SeqCst);
    }

    /// Unlocked read. Good enough for the first check in the poll handler; the decision to
    /// reset is taken under [`ChangeTracker::lock`].
    pub fn currently_changed(&self) -> bool {
        self.inner.changed.load(Ordering::SeqCst)
    }

    /// Record a host event.
    pub fn observe(&self, event: HostEvent) {
        trace!("Host event {event:?}, marking document changed");
        self.mark_changed();
    }

    /// A callback the host's event feed can hold without knowing about the tracker.
    pub fn on_host_change(&self) -> impl Fn() + Send + Sync + use<> {
        let tracker = self.clone();
        move || tracker.mark_changed()
    }

    /// Take the change lock for a check-export-reset sequence.
    pub fn lock(&self) -> ChangeGuard<'_> {
        ChangeGuard {
            tracker: self,
            _guard: self.acquire(),
        }
    }

    // The lock protects no data of its own, so a panic inside an export cannot leave
    // anything half-updated; recover the guard instead of propagating the poison.
    fn acquire(&self) -> MutexGuard<'_, ()> {
        self.inner
            .lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ChangeTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds the change lock. Dropping it releases the lock.
pub struct ChangeGuard<'a> {
    tracker: &'a ChangeTracker,
    _guard: MutexGuard<'a, ()>,
}

impl ChangeGuard<'_> {
    pub fn is_changed(&self) -> bool {
        self.tracker.inner.changed.load(Ordering::SeqCst)
    }

    pub fn reset_flag(&mut self) {
        self.tracker.inner.changed.store(false, Ordering::SeqCst);
    }
}
