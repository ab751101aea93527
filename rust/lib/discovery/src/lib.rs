//! Discovery — progressive topic discovery for the Trail site.
//!
//! Tracks which topics a learner has found and tells interested views,
//! exactly once per topic, when a topic is first found through a concrete
//! UI element.
//!
//! # Example
//!
//! ```
//! use trail_discovery::{DiscoveryTracker, ElementRef};
//!
//! let tracker = DiscoveryTracker::new();
//! let sub = tracker.on_discovery(|id, _source| println!("found {id}"));
//!
//! let link = ElementRef::new("a#tokens");
//! assert!(tracker.mark_topic_discovered("tokens", Some(&link)));  // prints
//! assert!(!tracker.mark_topic_discovered("tokens", Some(&link))); // already known
//! assert!(tracker.mark_topic_discovered("hardware", None));       // silent
//!
//! sub.unsubscribe();
//! tracker.reset_all_progress();
//! ```

pub mod element;
pub mod tracker;

pub use element::ElementRef;
pub use tracker::{DiscoveryCallback, DiscoveryTracker};
