use std::fmt;
use std::sync::Weak;

/// Unique handle for a subscription, returned inside every [`Unsubscribe`].
///
/// IDs are monotonic per registry and never reused, so removing by ID can
/// only ever remove the listener it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl SubscriptionId {
    /// Raw numeric value, for logging.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Type-erased side of a registry that can drop a listener by ID.
pub(crate) trait Detach: Send + Sync {
    fn detach(&self, id: SubscriptionId) -> bool;
}

/// Handle returned by every subscribe call.
///
/// Calling [`unsubscribe`](Self::unsubscribe) removes exactly the listener
/// it was issued for. Later calls are no-ops, as are calls made after the
/// registry itself was dropped. Dropping the handle does NOT unsubscribe;
/// a listener registered for the lifetime of the page can simply discard it.
pub struct Unsubscribe {
    id: SubscriptionId,
    registry: Weak<dyn Detach>,
}

impl Unsubscribe {
    pub(crate) fn new(id: SubscriptionId, registry: Weak<dyn Detach>) -> Self {
        Self { id, registry }
    }

    /// The subscription this handle controls.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove the listener.
    ///
    /// Returns `true` only for the call that actually removed it.
    pub fn unsubscribe(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.detach(self.id),
            None => false,
        }
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("id", &self.id)
            .field("registry_alive", &(self.registry.strong_count() > 0))
            .finish()
    }
}
