//! Site configuration.
//!
//! Reads a TOML file such as:
//!
//! ```toml
//! content = "content.json"
//! start = "intro"
//!
//! [router]
//! home = "intro"
//! up_history = "replace"
//! scroll_to_top = false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use trail_nav::RouterConfig;

/// Site configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Content listing (`.json` or `.toml`). Relative paths resolve
    /// against the config file's directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<PathBuf>,

    /// Initial URL segment; falls back to `router.home`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    pub router: RouterConfig,
}

impl SiteConfig {
    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: SiteConfig = toml::from_str(&content)?;
        if let (Some(listing), Some(dir)) = (config.content.as_mut(), path.parent()) {
            if listing.is_relative() {
                *listing = dir.join(&*listing);
            }
        }
        Ok(config)
    }

    /// URL the session starts at.
    pub fn start_url(&self) -> String {
        let start = self.start.as_deref().unwrap_or(&self.router.home);
        format!("/{}", start)
    }
}
