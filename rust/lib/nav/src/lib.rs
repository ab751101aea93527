//! Nav — breadcrumb routing for the Trail site.
//!
//! The router keeps three things in step: the current topic, the
//! breadcrumb that led to it, and the host's URL + session history.
//!
//! # Moves
//!
//! - Lateral: `navigate_to(id, NavigateOptions::default())` swaps the tip
//! - Drill-down: `navigate_to(id, NavigateOptions::drill())` appends
//! - Up: `navigate_up()` pops one level (no-op at the root)
//! - Back/forward: the host reports a pop-state, the router restores the
//!   breadcrumb saved in that entry's payload
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use trail_nav::{MemoryHost, NavigateOptions, NavigationHost, Router, RouterConfig};
//!
//! let host = Arc::new(MemoryHost::new("/intro"));
//! let router = Router::new(host.clone(), RouterConfig::default());
//!
//! router.navigate_to("tokens", NavigateOptions::drill());
//! router.navigate_to("context-window", NavigateOptions::drill());
//! assert_eq!(router.path(), ["intro", "tokens", "context-window"]);
//! assert_eq!(host.location(), "/context-window");
//!
//! host.back();
//! assert_eq!(router.path(), ["intro", "tokens"]);
//! ```

pub mod config;
pub mod host;
pub mod memory;
pub mod options;
pub mod router;
pub mod state;

// Re-export primary types at crate root.
pub use config::{RouterConfig, UpHistory};
pub use host::{NavigationHost, PopStateEvent, PopStateListener};
pub use memory::{HistoryEntry, MemoryHost};
pub use options::NavigateOptions;
pub use router::Router;
pub use state::{RouteState, node_id_from_url};
