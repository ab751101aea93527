//! Flux — observable state for the Trail site.
//!
//! Small synchronous pub/sub building blocks shared by the router and the
//! discovery tracker. Rust owns the state; the presentation layer only
//! subscribes and re-renders.
//!
//! # Primitives
//!
//! - [`Observable`] — one value with `get` / `set` / `subscribe`
//! - [`Subscribers`] — ordered listener registry behind every observer list
//! - [`Unsubscribe`] — handle returned by every subscribe call
//!
//! # Notification rules
//!
//! - Synchronous: every listener has run before the writing call returns.
//! - Ordered: listeners run in registration order.
//! - Re-entrant: no lock is held while a listener runs.
//!
//! # Example
//!
//! ```
//! use trail_flux::Observable;
//!
//! let count = Observable::new(0u32);
//! let sub = count.subscribe(|v| println!("count is now {v}"));
//!
//! count.set(1);
//! assert_eq!(count.get(), 1);
//!
//! sub.unsubscribe();
//! ```

pub mod observable;
pub mod subscribers;
pub mod value;

// Re-export primary types at crate root.
pub use observable::{ChangeHandler, Observable};
pub use subscribers::Subscribers;
pub use value::{SubscriptionId, Unsubscribe};
