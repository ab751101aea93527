use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use crate::value::{Detach, SubscriptionId, Unsubscribe};

/// Ordered listener registry.
///
/// Every observer list in the workspace is one of these: route listeners,
/// discovery observers, and host pop-state listeners.
///
/// - `add(handler)` appends a listener and returns its [`Unsubscribe`] handle.
/// - `remove(id)` drops a listener by ID.
/// - `for_each(f)` visits listeners in registration order.
///
/// Handlers are never called while the internal lock is held, so a handler
/// may subscribe, unsubscribe, or trigger another notification.
pub struct Subscribers<F: ?Sized> {
    registry: Arc<Registry<F>>,
}

struct Registry<F: ?Sized> {
    /// Entries in registration order.
    entries: RwLock<Vec<Entry<F>>>,
    /// Monotonic counter for subscription IDs.
    next_id: AtomicU64,
}

struct Entry<F: ?Sized> {
    id: SubscriptionId,
    handler: Arc<F>,
}

impl<F: ?Sized> Clone for Entry<F> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<F: ?Sized> Registry<F> {
    fn contains(&self, id: SubscriptionId) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.iter().any(|e| e.id == id)
    }
}

impl<F: ?Sized + Send + Sync> Detach for Registry<F> {
    fn detach(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|e| e.id != id);
        entries.len() < before
    }
}

impl<F: ?Sized + Send + Sync + 'static> Subscribers<F> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry {
                entries: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Append a listener. It is notified after every listener added before it.
    pub fn add(&self, handler: Arc<F>) -> Unsubscribe {
        let id = SubscriptionId(self.registry.next_id.fetch_add(1, Ordering::Relaxed));
        {
            let mut entries = self
                .registry
                .entries
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            entries.push(Entry { id, handler });
        }
        let registry: Arc<dyn Detach> = self.registry.clone();
        let weak: Weak<dyn Detach> = Arc::downgrade(&registry);
        Unsubscribe::new(id, weak)
    }

    /// Remove a listener by ID. Returns `false` if it was not registered.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        self.registry.detach(id)
    }

    /// Visit every listener in registration order.
    ///
    /// The listener list is snapshotted first: a listener added during the
    /// walk is not visited, and a listener removed during the walk is skipped
    /// if it has not been reached yet.
    pub fn for_each(&self, mut f: impl FnMut(&F)) {
        self.for_each_while(|handler| {
            f(handler);
            true
        });
    }

    /// Like [`for_each`](Self::for_each), but stops as soon as `f` returns
    /// `false`. Returns `true` if every listener was visited.
    pub fn for_each_while(&self, mut f: impl FnMut(&F) -> bool) -> bool {
        let snapshot: Vec<Entry<F>> = {
            let entries = self
                .registry
                .entries
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            entries.clone()
        };
        for entry in snapshot {
            if self.registry.contains(entry.id) && !f(&entry.handler) {
                return false;
            }
        }
        true
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.registry
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every listener. Outstanding handles become no-ops.
    pub fn clear(&self) {
        self.registry
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<F: ?Sized + Send + Sync + 'static> Default for Subscribers<F> {
    fn default() -> Self {
        Self::new()
    }
}
