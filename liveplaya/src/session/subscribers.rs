//! Subscriber registry with snapshot iteration.
//!
//! Listeners are stored in a copy-on-write list. A notification pass walks
//! the list as it was when the pass started, so listeners may subscribe or
//! unsubscribe (themselves or others) from inside a callback without
//! affecting the pass in progress.
//!
//! # Serialized Passes
//!
//! Notification passes never overlap. A [`notify`](SubscriberRegistry::notify)
//! that arrives while a pass is running, whether from another thread or
//! re-entrantly from a listener, is queued and delivered by the running
//! pass once it completes. Each `notify` call results in exactly one pass.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// A state-change callback. Invoked with no arguments; listeners read the
/// current state from the session.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Identity of one registration.
///
/// Registering the same callback twice yields two distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Clone)]
struct Entry {
    id: ListenerId,
    listener: Listener,
}

#[derive(Debug, Default)]
struct Dispatch {
    running: bool,
    pending: usize,
}

/// Resets the dispatch flags if a listener panics mid-pass.
struct DispatchGuard<'a> {
    dispatch: &'a Mutex<Dispatch>,
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let mut dispatch = self.dispatch.lock();
            dispatch.running = false;
            dispatch.pending = 0;
        }
    }
}

/// Ordered set of listener registrations.
pub struct SubscriberRegistry {
    entries: Mutex<Arc<Vec<Entry>>>,
    next_id: AtomicU64,
    dispatch: Mutex<Dispatch>,
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

impl SubscriberRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Arc::new(Vec::new())),
            next_id: AtomicU64::new(1),
            dispatch: Mutex::new(Dispatch::default()),
        }
    }

    /// Append a registration.
    pub fn add(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut entries = self.entries.lock();
        Arc::make_mut(&mut entries).push(Entry { id, listener });
        id
    }

    /// Remove a registration. Returns `false` if it was already gone.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.lock();
        match entries.iter().position(|e| e.id == id) {
            Some(idx) => {
                Arc::make_mut(&mut entries).remove(idx);
                true
            }
            None => false,
        }
    }

    /// Drop every registration.
    pub fn clear(&self) {
        *self.entries.lock() = Arc::new(Vec::new());
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether there are no registrations.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Arc<Vec<Entry>> {
        let entries = self.entries.lock();
        Arc::clone(&*entries)
    }

    /// Run one notification pass over the current registrations.
    ///
    /// If a pass is already running the request is queued for it instead.
    pub fn notify(&self) {
        {
            let mut dispatch = self.dispatch.lock();
            dispatch.pending += 1;
            if dispatch.running {
                return;
            }
            dispatch.running = true;
        }

        let _guard = DispatchGuard {
            dispatch: &self.dispatch,
        };

        loop {
            {
                let mut dispatch = self.dispatch.lock();
                if dispatch.pending == 0 {
                    dispatch.running = false;
                    return;
                }
                dispatch.pending -= 1;
            }

            let snapshot = self.snapshot();
            for entry in snapshot.iter() {
                (entry.listener)();
            }
        }
    }
}

/// Handle returned by `subscribe`; removes exactly its own registration.
///
/// Dropping the handle does not unsubscribe.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: ListenerId,
    registry: Weak<SubscriberRegistry>,
}

impl Subscription {
    pub(crate) fn new(id: ListenerId, registry: &Arc<SubscriberRegistry>) -> Self {
        Self {
            id,
            registry: Arc::downgrade(registry),
        }
    }

    /// The registration this handle controls.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Remove the registration. Safe to call more than once and from
    /// inside a notification.
    pub fn unsubscribe(&self) -> bool {
        self.registry
            .upgrade()
            .map(|registry| registry.remove(self.id))
            .unwrap_or(false)
    }
}
