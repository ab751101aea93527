use std::sync::{Arc, Weak};

use tracing::{debug, warn};
use trail_flux::{Observable, Unsubscribe};

use crate::config::{RouterConfig, UpHistory};
use crate::host::{NavigationHost, PopStateEvent};
use crate::options::NavigateOptions;
use crate::state::RouteState;

/// Breadcrumb router.
///
/// Owns the current [`RouteState`] and keeps it consistent with the host's
/// URL and session history:
///
/// - `navigate_to(id, opts)` — lateral move or drill-down, pushed or replaced
/// - `navigate_up()` — one breadcrumb level toward the root
/// - back/forward — restored verbatim from the history payload
///
/// The URL only ever carries the leaf (`/` + node id). Ancestry travels in
/// the payload attached to each history entry, which is why back/forward
/// never re-derives the path from the URL unless the payload is missing.
///
/// Every operation is synchronous: the host history is written first, then
/// the observable route is updated and its subscribers run, all before the
/// call returns.
pub struct Router {
    route: Observable<RouteState>,
    host: Arc<dyn NavigationHost>,
    config: RouterConfig,
    pop_listener: Unsubscribe,
}

impl Router {
    /// Create a router attached to `host`.
    ///
    /// The initial route is read from the host's current URL as a
    /// single-element path; the URL alone cannot reconstruct ancestry.
    /// The router registers itself as the host's back/forward listener and
    /// detaches again when dropped.
    pub fn new(host: Arc<dyn NavigationHost>, config: RouterConfig) -> Arc<Self> {
        let initial = RouteState::from_url(&host.location(), &config.home);
        debug!(route = %initial, "router initialized");

        Arc::new_cyclic(|weak: &Weak<Router>| {
            let weak = weak.clone();
            let pop_listener = host.on_pop_state(Arc::new(move |event: &PopStateEvent| {
                if let Some(router) = weak.upgrade() {
                    router.handle_pop_state(event);
                }
            }));
            Router {
                route: Observable::new(initial),
                host,
                config,
                pop_listener,
            }
        })
    }

    // ====================================================================
    // Navigation
    // ====================================================================

    /// Move to `node_id`.
    ///
    /// With `add_to_path` the id is appended to the breadcrumb (drill-down);
    /// otherwise it replaces the breadcrumb's tip (lateral move). The entry
    /// is pushed onto host history unless `replace` is set, in which case the
    /// current entry is overwritten. The id is not validated.
    pub fn navigate_to(&self, node_id: impl Into<String>, options: NavigateOptions) {
        let node_id = node_id.into();
        let next = self.route.with(|current| {
            if options.add_to_path {
                current.drill(node_id)
            } else {
                current.lateral(node_id)
            }
        });
        debug!(
            route = %next,
            replace = options.replace,
            add_to_path = options.add_to_path,
            "navigate"
        );
        self.commit(next, options.replace);
    }

    /// Move one breadcrumb level toward the root.
    ///
    /// Returns `false` without touching state or history when the breadcrumb
    /// is already at its root. The history write follows
    /// [`RouterConfig::up_history`].
    pub fn navigate_up(&self) -> bool {
        let Some(next) = self.route.with(RouteState::up) else {
            debug!("navigate up at root ignored");
            return false;
        };
        debug!(route = %next, up_history = ?self.config.up_history, "navigate up");
        self.commit(next, self.config.up_history == UpHistory::Replace);
        true
    }

    /// Apply a back/forward move reported by the host.
    ///
    /// The attached payload is restored as-is. Entries without a usable
    /// payload (the cold-start entry, or one written by someone else) fall
    /// back to the single-element route derived from the entry's URL.
    /// History is never written from here.
    pub fn handle_pop_state(&self, event: &PopStateEvent) {
        let state = match event.route_state() {
            Some(Ok(state)) => state,
            Some(Err(e)) => {
                warn!(url = %event.url, error = %e, "unusable history payload, using URL");
                RouteState::from_url(&event.url, &self.config.home)
            }
            None => RouteState::from_url(&event.url, &self.config.home),
        };
        debug!(route = %state, "restored from history");
        self.route.set(state);
    }

    /// Re-derive the route from the host's current URL, as at startup.
    ///
    /// History is left untouched. Subscribers are notified.
    pub fn reset(&self) {
        let state = RouteState::from_url(&self.host.location(), &self.config.home);
        debug!(route = %state, "router reset");
        self.route.set(state);
    }

    fn commit(&self, next: RouteState, replace: bool) {
        let url = next.url();
        if replace {
            self.host.replace_state(&next, &url);
        } else {
            self.host.push_state(&next, &url);
        }
        self.route.set(next);
        if self.config.scroll_to_top {
            self.host.scroll_to_top();
        }
    }

    // ====================================================================
    // Read
    // ====================================================================

    /// Snapshot of the current route.
    pub fn current(&self) -> RouteState {
        self.route.get()
    }

    /// Identifier of the displayed topic.
    pub fn node_id(&self) -> String {
        self.route.with(|r| r.node_id().to_string())
    }

    /// Current breadcrumb, root first.
    pub fn path(&self) -> Vec<String> {
        self.route.with(|r| r.path().to_vec())
    }

    /// Current breadcrumb depth.
    pub fn depth(&self) -> usize {
        self.route.with(RouteState::depth)
    }

    /// The observable route, for subscriptions.
    pub fn route(&self) -> &Observable<RouteState> {
        &self.route
    }

    /// Subscribe to route changes. Shorthand for `route().subscribe(..)`.
    pub fn subscribe<F>(&self, handler: F) -> Unsubscribe
    where
        F: Fn(&RouteState) + Send + Sync + 'static,
    {
        self.route.subscribe(handler)
    }

    /// Active configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

impl Drop for Router {
    fn drop(&mut self) {
        self.pop_listener.unsubscribe();
    }
}
