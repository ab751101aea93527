use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;
use trail_flux::{Observable, Subscribers, Unsubscribe};

use crate::element::ElementRef;

/// Callback type for first-discovery notifications: `(node_id, source)`.
pub type DiscoveryCallback = dyn Fn(&str, &ElementRef) + Send + Sync;

/// Records which topics the user has found.
///
/// Each topic moves `unknown → discovered` exactly once; the only way back
/// is [`reset_all_progress`](Self::reset_all_progress), which returns every
/// topic to `unknown` at once.
///
/// Observers registered with [`on_discovery`](Self::on_discovery) hear about
/// a topic at most once per reset cycle, and only when the discovery came
/// with a source element. Silent discoveries (no element) still count as
/// progress.
pub struct DiscoveryTracker {
    /// Discovered topic ids. Observable so views can re-render on progress.
    discovered: Observable<BTreeSet<String>>,
    /// First-discovery observers, in registration order.
    observers: Subscribers<DiscoveryCallback>,
}

impl DiscoveryTracker {
    /// Create a tracker with nothing discovered and no observers.
    pub fn new() -> Self {
        Self {
            discovered: Observable::new(BTreeSet::new()),
            observers: Subscribers::new(),
        }
    }

    /// Register a first-discovery observer.
    ///
    /// The returned handle removes exactly this observer; calling it again is
    /// a no-op.
    pub fn on_discovery<F>(&self, callback: F) -> Unsubscribe
    where
        F: Fn(&str, &ElementRef) + Send + Sync + 'static,
    {
        let callback: Arc<DiscoveryCallback> = Arc::new(callback);
        let handle = self.observers.add(callback);
        debug!(subscription = %handle.id(), "discovery observer registered");
        handle
    }

    /// Mark `node_id` as discovered.
    ///
    /// Returns `false` and does nothing if it was already discovered.
    /// Otherwise records it and returns `true`; when `source` is given, every
    /// observer is called with `(node_id, source)` in registration order
    /// before this returns. The id is not validated.
    pub fn mark_topic_discovered(&self, node_id: &str, source: Option<&ElementRef>) -> bool {
        let inserted = self
            .discovered
            .update_if(|set| set.insert(node_id.to_string()));
        if !inserted {
            return false;
        }

        match source {
            Some(element) => {
                debug!(node_id, observers = self.observers.len(), "topic discovered");
                self.observers
                    .for_each(|observer| observer(node_id, element));
            }
            None => debug!(node_id, "topic discovered silently"),
        }
        true
    }

    /// Forget every discovery. Observers stay registered.
    ///
    /// `progress()` subscribers are only notified if something was cleared.
    pub fn reset_all_progress(&self) {
        let mut cleared = 0;
        self.discovered.update_if(|set| {
            cleared = set.len();
            set.clear();
            cleared > 0
        });
        debug!(cleared, "discovery progress reset");
    }

    // ====================================================================
    // Read
    // ====================================================================

    /// Whether `node_id` has been discovered since the last reset.
    pub fn is_discovered(&self, node_id: &str) -> bool {
        self.discovered.with(|set| set.contains(node_id))
    }

    /// Discovered ids, sorted.
    pub fn discovered(&self) -> Vec<String> {
        self.discovered.with(|set| set.iter().cloned().collect())
    }

    /// Number of discovered topics.
    pub fn discovered_count(&self) -> usize {
        self.discovered.with(BTreeSet::len)
    }

    /// Number of registered observers.
    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    /// The discovered set as an observable, for progress views.
    ///
    /// Notified on every new discovery (silent or not) and on reset.
    pub fn progress(&self) -> &Observable<BTreeSet<String>> {
        &self.discovered
    }
}

impl Default for DiscoveryTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn counter(tracker: &DiscoveryTracker) -> (Arc<AtomicU64>, Unsubscribe) {
        let count = Arc::new(AtomicU64::new(0));
        let c = count.clone();
        let handle = tracker.on_discovery(move |_, _| {
            c.fetch_add(1, Ordering::Relaxed);
        });
        (count, handle)
    }

    fn anchor() -> ElementRef {
        ElementRef::new("a.topic-link")
    }

    // ========================================================================
    // mark_topic_discovered
    // ========================================================================

    #[test]
    fn first_discovery_returns_true_and_notifies() {
        let tracker = DiscoveryTracker::new();
        let (count, _h) = counter(&tracker);

        assert!(tracker.mark_topic_discovered("tokens", Some(&anchor())));
        assert_eq!(count.load(Ordering::Relaxed), 1);
        assert!(tracker.is_discovered("tokens"));
    }

    #[test]
    fn second_discovery_returns_false_and_is_silent() {
        let tracker = DiscoveryTracker::new();
        let (count, _h) = counter(&tracker);
        let el = anchor();

        assert!(tracker.mark_topic_discovered("tokens", Some(&el)));
        assert!(!tracker.mark_topic_discovered("tokens", Some(&el)));
        assert!(!tracker.mark_topic_discovered("tokens", None));

        assert_eq!(count.load(Ordering::Relaxed), 1);
        assert_eq!(tracker.discovered_count(), 1);
    }

    #[test]
    fn discovery_without_element_is_recorded_silently() {
        let tracker = DiscoveryTracker::new();
        let (count, _h) = counter(&tracker);

        assert!(tracker.mark_topic_discovered("tokens", None));
        assert_eq!(count.load(Ordering::Relaxed), 0);
        assert!(tracker.is_discovered("tokens"));

        // A later discovery with an element does not fire either: the topic
        // is already known.
        assert!(!tracker.mark_topic_discovered("tokens", Some(&anchor())));
        assert_eq!(count.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn observers_receive_id_and_element() {
        let tracker = DiscoveryTracker::new();
        let seen = Arc::new(Mutex::new(Vec::<(String, bool)>::new()));
        let s = seen.clone();
        let el = anchor();
        let el_c = el.clone();

        let _h = tracker.on_discovery(move |id, source| {
            s.lock().unwrap().push((id.to_string(), source.ptr_eq(&el_c)));
        });

        tracker.mark_topic_discovered("hardware", Some(&el));
        assert_eq!(*seen.lock().unwrap(), vec![("hardware".to_string(), true)]);
    }

    #[test]
    fn observers_fire_in_registration_order() {
        let tracker = DiscoveryTracker::new();
        let order = Arc::new(Mutex::new(Vec::<&str>::new()));
        let (o1, o2, o3) = (order.clone(), order.clone(), order.clone());

        let _a = tracker.on_discovery(move |_, _| o1.lock().unwrap().push("a"));
        let _b = tracker.on_discovery(move |_, _| o2.lock().unwrap().push("b"));
        let _c = tracker.on_discovery(move |_, _| o3.lock().unwrap().push("c"));

        tracker.mark_topic_discovered("tokens", Some(&anchor()));
        assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn ids_are_not_validated() {
        let tracker = DiscoveryTracker::new();
        assert!(tracker.mark_topic_discovered("", None));
        assert!(tracker.mark_topic_discovered("does/not/exist", None));
        assert_eq!(tracker.discovered_count(), 2);
    }

    // ========================================================================
    // Unsubscribe
    // ========================================================================

    #[test]
    fn unsubscribed_observer_never_fires_again() {
        let tracker = DiscoveryTracker::new();
        let (gone, gone_h) = counter(&tracker);
        let (kept, _kept_h) = counter(&tracker);

        tracker.mark_topic_discovered("a", Some(&anchor()));
        assert!(gone_h.unsubscribe());
        tracker.mark_topic_discovered("b", Some(&anchor()));

        assert_eq!(gone.load(Ordering::Relaxed), 1);
        assert_eq!(kept.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let tracker = DiscoveryTracker::new();
        let (_count, h) = counter(&tracker);
        let (_other, _h2) = counter(&tracker);

        assert!(h.unsubscribe());
        assert!(!h.unsubscribe());
        assert_eq!(tracker.subscriber_count(), 1);
    }

    #[test]
    fn observer_can_unsubscribe_itself() {
        let tracker = DiscoveryTracker::new();
        let count = Arc::new(AtomicU64::new(0));
        let slot: Arc<Mutex<Option<Unsubscribe>>> = Arc::new(Mutex::new(None));

        let c = count.clone();
        let s = slot.clone();
        let handle = tracker.on_discovery(move |_, _| {
            c.fetch_add(1, Ordering::Relaxed);
            if let Some(h) = s.lock().unwrap().as_ref() {
                h.unsubscribe();
            }
        });
        *slot.lock().unwrap() = Some(handle);

        tracker.mark_topic_discovered("a", Some(&anchor()));
        tracker.mark_topic_discovered("b", Some(&anchor()));

        assert_eq!(count.load(Ordering::Relaxed), 1);
        assert_eq!(tracker.subscriber_count(), 0);
    }

    #[test]
    fn observer_may_mark_other_topics() {
        let tracker = Arc::new(DiscoveryTracker::new());
        let weak = Arc::downgrade(&tracker);

        // Finding a topic also silently seeds its prerequisite.
        let _h = tracker.on_discovery(move |id, _| {
            if id == "context-window" {
                if let Some(t) = weak.upgrade() {
                    t.mark_topic_discovered("tokens", None);
                }
            }
        });

        tracker.mark_topic_discovered("context-window", Some(&anchor()));
        assert_eq!(tracker.discovered(), vec!["context-window", "tokens"]);
    }

    // ========================================================================
    // Reset
    // ========================================================================

    #[test]
    fn reset_allows_rediscovery() {
        let tracker = DiscoveryTracker::new();
        let (count, _h) = counter(&tracker);

        tracker.mark_topic_discovered("tokens", Some(&anchor()));
        tracker.reset_all_progress();

        assert!(!tracker.is_discovered("tokens"));
        assert_eq!(tracker.discovered_count(), 0);
        assert!(tracker.mark_topic_discovered("tokens", Some(&anchor())));
        assert_eq!(count.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn reset_keeps_observers() {
        let tracker = DiscoveryTracker::new();
        let (_a, _ha) = counter(&tracker);
        let (_b, _hb) = counter(&tracker);

        tracker.reset_all_progress();
        assert_eq!(tracker.subscriber_count(), 2);
    }

    #[test]
    fn reset_on_empty_tracker() {
        let tracker = DiscoveryTracker::default();
        tracker.reset_all_progress();
        assert!(tracker.discovered().is_empty());
    }

    // ========================================================================
    // Progress observable
    // ========================================================================

    #[test]
    fn progress_notified_on_new_discoveries_and_reset() {
        let tracker = DiscoveryTracker::new();
        let sizes = Arc::new(Mutex::new(Vec::<usize>::new()));
        let s = sizes.clone();
        let _p = tracker.progress().subscribe(move |set| s.lock().unwrap().push(set.len()));

        tracker.mark_topic_discovered("a", None);
        tracker.mark_topic_discovered("b", Some(&anchor()));
        tracker.mark_topic_discovered("b", Some(&anchor())); // duplicate, no change
        tracker.reset_all_progress();

        assert_eq!(*sizes.lock().unwrap(), vec![1, 2, 0]);
    }

    #[test]
    fn reset_when_empty_is_silent() {
        let tracker = DiscoveryTracker::new();
        let sizes = Arc::new(Mutex::new(Vec::<usize>::new()));
        let s = sizes.clone();
        let _p = tracker.progress().subscribe(move |set| s.lock().unwrap().push(set.len()));

        tracker.reset_all_progress();
        assert!(sizes.lock().unwrap().is_empty());

        tracker.mark_topic_discovered("a", None);
        tracker.reset_all_progress();
        tracker.reset_all_progress();
        assert_eq!(*sizes.lock().unwrap(), vec![1, 0]);
    }

    #[test]
    fn progress_is_updated_before_observers_run() {
        let tracker = Arc::new(DiscoveryTracker::new());
        let weak = Arc::downgrade(&tracker);
        let seen = Arc::new(AtomicU64::new(0));
        let s = seen.clone();

        let _h = tracker.on_discovery(move |id, _| {
            if let Some(t) = weak.upgrade() {
                if t.is_discovered(id) {
                    s.fetch_add(1, Ordering::Relaxed);
                }
            }
        });

        tracker.mark_topic_discovered("a", Some(&anchor()));
        assert_eq!(seen.load(Ordering::Relaxed), 1);
    }

    // ========================================================================
    // Thread safety
    // ========================================================================

    #[test]
    fn concurrent_marks_notify_once() {
        use std::thread;

        let tracker = Arc::new(DiscoveryTracker::new());
        let (count, _h) = counter(&tracker);

        let mut handles = vec![];
        for _ in 0..8 {
            let t = tracker.clone();
            handles.push(thread::spawn(move || {
                t.mark_topic_discovered("tokens", Some(&ElementRef::new(())))
            }));
        }
        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(wins, 1);
        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    // Compile-time: DiscoveryTracker must be Send + Sync.
    fn _assert_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<DiscoveryTracker>();
        assert_sync::<DiscoveryTracker>();
    }
}
