use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::subscribers::Subscribers;
use crate::value::Unsubscribe;

/// Callback type for value change notifications.
pub type ChangeHandler<T> = dyn Fn(&T) + Send + Sync;

/// A single observable value.
///
/// - `get()` reads the current value (clone).
/// - `with(f)` reads through a borrow, without cloning.
/// - `set(value)` stores a value and notifies every subscriber.
/// - `subscribe(handler)` registers a change handler.
///
/// Notification is synchronous and in registration order. The new value is
/// stored and the lock released before the first handler runs, so handlers
/// may read the cell (and see the new value) or write it again.
///
/// A handler that writes the cell starts a nested round that reaches every
/// handler with the newer value; the outer round then stops. The last value
/// each handler sees is always the value the cell holds.
pub struct Observable<T> {
    value: RwLock<T>,
    /// Bumped under the write lock on every change.
    generation: AtomicU64,
    handlers: Subscribers<ChangeHandler<T>>,
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
    /// Create a cell holding `initial`. No notification is sent.
    pub fn new(initial: T) -> Self {
        Self {
            value: RwLock::new(initial),
            generation: AtomicU64::new(0),
            handlers: Subscribers::new(),
        }
    }

    /// Current value.
    pub fn get(&self) -> T {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Read the current value through a borrow.
    ///
    /// The read lock is held while `f` runs; `f` must not write this cell.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = self.value.read().unwrap_or_else(PoisonError::into_inner);
        f(&*value)
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        let snapshot = value.clone();
        let generation = {
            let mut current = self.value.write().unwrap_or_else(PoisonError::into_inner);
            *current = value;
            self.bump()
        };
        self.notify(&snapshot, generation);
    }

    /// Mutate the value in place and notify subscribers.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let (result, snapshot, generation) = {
            let mut current = self.value.write().unwrap_or_else(PoisonError::into_inner);
            let result = f(&mut *current);
            (result, current.clone(), self.bump())
        };
        self.notify(&snapshot, generation);
        result
    }

    /// Mutate the value in place; notify only if `f` reports a change.
    ///
    /// Check-and-modify happens under one write lock, so two callers can
    /// never both observe the "unchanged" state and both apply the change.
    pub fn update_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        let (snapshot, generation) = {
            let mut current = self.value.write().unwrap_or_else(PoisonError::into_inner);
            if !f(&mut *current) {
                return false;
            }
            (current.clone(), self.bump())
        };
        self.notify(&snapshot, generation);
        true
    }

    /// Register a change handler, called with the new value after each write.
    pub fn subscribe<F>(&self, handler: F) -> Unsubscribe
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let handler: Arc<ChangeHandler<T>> = Arc::new(handler);
        self.handlers.add(handler)
    }

    /// Number of registered change handlers.
    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }

    /// Caller holds the write lock.
    fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Deliver `value` until a newer write supersedes it.
    fn notify(&self, value: &T, generation: u64) {
        self.handlers.for_each_while(|handler| {
            if self.generation.load(Ordering::Acquire) != generation {
                return false;
            }
            handler(value);
            true
        });
    }
}

impl<T: Clone + Default + Send + Sync + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.value.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Observable").field("value", &*value).finish()
    }
}
