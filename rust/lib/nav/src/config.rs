use serde::{Deserialize, Serialize};

/// How [`Router::navigate_up`](crate::Router::navigate_up) records itself in
/// host history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpHistory {
    /// Push a new entry, like a default `navigate_to`. Back returns to the child.
    #[default]
    Push,
    /// Overwrite the current entry. "Up" is an in-place view change and the
    /// back-stack length is unchanged.
    Replace,
}

/// Router behavior knobs.
///
/// Deserializable so it can sit in a `[router]` table of a site config file.
/// Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Topic shown when the URL path is empty (`/`).
    pub home: String,

    /// History behavior of `navigate_up`.
    pub up_history: UpHistory,

    /// Reset the viewport scroll after each navigation.
    pub scroll_to_top: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            home: "intro".to_string(),
            up_history: UpHistory::Push,
            scroll_to_top: true,
        }
    }
}
