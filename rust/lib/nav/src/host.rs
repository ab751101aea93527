use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use trail_flux::Unsubscribe;

use crate::state::RouteState;

/// Callback type for inbound back/forward navigation.
pub type PopStateListener = dyn Fn(&PopStateEvent) + Send + Sync;

/// A back/forward move performed by the user, as reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct PopStateEvent {
    /// URL of the entry that became current.
    pub url: String,
    /// Payload attached when the entry was pushed or replaced. `None` for
    /// entries the router never wrote (e.g. the page's first entry).
    pub state: Option<Value>,
}

impl PopStateEvent {
    /// Decode the attached payload.
    ///
    /// `None` when no payload is attached; `Some(Err(_))` when one is attached
    /// but is not a valid `RouteState`.
    pub fn route_state(&self) -> Option<Result<RouteState, serde_json::Error>> {
        self.state
            .as_ref()
            .filter(|v| !v.is_null())
            .map(RouteState::deserialize)
    }
}

/// The browser-side surface the router drives: location, session history,
/// viewport scroll, and the back/forward event source.
///
/// A wasm host maps these onto `window.location`, `history.pushState`,
/// `history.replaceState`, `window.scrollTo(0, 0)` and `popstate`;
/// [`MemoryHost`](crate::MemoryHost) keeps it all in process.
pub trait NavigationHost: Send + Sync {
    /// Current URL path, e.g. `/tokens`.
    fn location(&self) -> String;

    /// Push a new history entry carrying `state`, and show `url`.
    fn push_state(&self, state: &RouteState, url: &str);

    /// Overwrite the current history entry with `state`, and show `url`.
    fn replace_state(&self, state: &RouteState, url: &str);

    /// Reset the viewport scroll position to the top.
    fn scroll_to_top(&self);

    /// Register a back/forward listener.
    fn on_pop_state(&self, listener: Arc<PopStateListener>) -> Unsubscribe;
}
