use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tracing::{debug, warn};
use trail_flux::{Subscribers, Unsubscribe};

use crate::host::{NavigationHost, PopStateEvent, PopStateListener};
use crate::state::RouteState;

/// One entry of the session history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub url: String,
    /// Serialized payload; `None` for entries nobody attached state to.
    pub state: Option<Value>,
}

/// In-process [`NavigationHost`] with browser session-history semantics.
///
/// - `push_state` drops every entry after the cursor, then appends.
/// - `replace_state` overwrites the entry at the cursor.
/// - `back` / `forward` / `go` move the cursor and dispatch a
///   [`PopStateEvent`] to listeners; moving past either end is refused.
///
/// Payloads are stored as JSON values, the way a browser structured-clones
/// them, so a pushed state can never be mutated through the router.
pub struct MemoryHost {
    history: RwLock<Stack>,
    listeners: Subscribers<PopStateListener>,
    scroll_resets: AtomicU64,
}

struct Stack {
    entries: Vec<HistoryEntry>,
    index: usize,
}

impl MemoryHost {
    /// Create a host whose only history entry is `initial_url`, with no payload.
    pub fn new(initial_url: impl Into<String>) -> Self {
        Self {
            history: RwLock::new(Stack {
                entries: vec![HistoryEntry {
                    url: initial_url.into(),
                    state: None,
                }],
                index: 0,
            }),
            listeners: Subscribers::new(),
            scroll_resets: AtomicU64::new(0),
        }
    }

    /// Number of entries in the session history.
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    /// Always `false`: a session history holds at least one entry.
    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Cursor position (0-based).
    pub fn index(&self) -> usize {
        self.read().index
    }

    /// Entry at the cursor.
    pub fn current(&self) -> HistoryEntry {
        let stack = self.read();
        stack.entries[stack.index].clone()
    }

    /// Every entry, oldest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.read().entries.clone()
    }

    /// How many times the viewport was scrolled to the top.
    pub fn scroll_resets(&self) -> u64 {
        self.scroll_resets.load(Ordering::Relaxed)
    }

    /// Whether `back` would move.
    pub fn can_go_back(&self) -> bool {
        self.read().index > 0
    }

    /// Whether `forward` would move.
    pub fn can_go_forward(&self) -> bool {
        let stack = self.read();
        stack.index + 1 < stack.entries.len()
    }

    /// User pressed back. Returns `false` at the oldest entry.
    pub fn back(&self) -> bool {
        self.go(-1)
    }

    /// User pressed forward. Returns `false` at the newest entry.
    pub fn forward(&self) -> bool {
        self.go(1)
    }

    /// Move the cursor by `delta` and dispatch a pop-state event.
    ///
    /// Out-of-range moves and `delta == 0` do nothing and return `false`.
    pub fn go(&self, delta: isize) -> bool {
        let event = {
            let mut stack = self.history.write().unwrap_or_else(PoisonError::into_inner);
            let target = match stack.index.checked_add_signed(delta) {
                Some(t) if delta != 0 && t < stack.entries.len() => t,
                _ => return false,
            };
            stack.index = target;
            let entry = &stack.entries[target];
            PopStateEvent {
                url: entry.url.clone(),
                state: entry.state.clone(),
            }
        };
        debug!(url = %event.url, delta, "pop state");
        self.listeners.for_each(|listener| listener(&event));
        true
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Stack> {
        self.history.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn encode(state: &RouteState) -> Option<Value> {
        match serde_json::to_value(state) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "failed to encode history payload");
                None
            }
        }
    }
}

impl NavigationHost for MemoryHost {
    fn location(&self) -> String {
        self.current().url
    }

    fn push_state(&self, state: &RouteState, url: &str) {
        let entry = HistoryEntry {
            url: url.to_string(),
            state: Self::encode(state),
        };
        let mut stack = self.history.write().unwrap_or_else(PoisonError::into_inner);
        let keep = stack.index + 1;
        stack.entries.truncate(keep);
        stack.entries.push(entry);
        stack.index = keep;
    }

    fn replace_state(&self, state: &RouteState, url: &str) {
        let entry = HistoryEntry {
            url: url.to_string(),
            state: Self::encode(state),
        };
        let mut stack = self.history.write().unwrap_or_else(PoisonError::into_inner);
        let index = stack.index;
        stack.entries[index] = entry;
    }

    fn scroll_to_top(&self) {
        self.scroll_resets.fetch_add(1, Ordering::Relaxed);
    }

    fn on_pop_state(&self, listener: Arc<PopStateListener>) -> Unsubscribe {
        self.listeners.add(listener)
    }
}
