use std::path::PathBuf;

use thiserror::Error;

/// Failure to load a content listing.
///
/// Only the loader can fail; lookups on a loaded index never do, and topic
/// ids are never rejected.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON listing: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML listing: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported listing format: {0}")]
    UnsupportedFormat(String),
}
