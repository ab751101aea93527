//! Core — content listing shared by the Trail site.
//!
//! Topics come from a provider; the router and discovery tracker treat ids
//! as opaque strings and never consult the listing.

pub mod content;
pub mod error;

pub use content::{ContentIndex, ContentItem, ContentMeta, ContentProvider};
pub use error::ContentError;
