use std::fmt;

use serde::{Deserialize, Serialize};

/// Current navigation position: the displayed topic plus its breadcrumb.
///
/// `path` runs root-to-current and is never empty; its last element is
/// always `node_id`. The only ways to build one are the constructors and
/// transitions below (and deserialization, which checks the same rule), so
/// a `RouteState` in hand always satisfies the invariant.
///
/// Serialized as `{"nodeId": "...", "path": [...]}`; this is the payload
/// attached to every history entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawRouteState")]
pub struct RouteState {
    node_id: String,
    path: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRouteState {
    node_id: String,
    path: Vec<String>,
}

impl TryFrom<RawRouteState> for RouteState {
    type Error = String;

    fn try_from(raw: RawRouteState) -> Result<Self, Self::Error> {
        RouteState::from_parts(raw.node_id, raw.path)
            .ok_or_else(|| "path must be non-empty and end with nodeId".to_string())
    }
}

impl RouteState {
    /// Single-element route. Used at cold start, where only the leaf is known.
    pub fn root(node_id: impl Into<String>) -> Self {
        let node_id = node_id.into();
        Self {
            path: vec![node_id.clone()],
            node_id,
        }
    }

    /// Build from raw parts. Returns `None` unless `path` ends with `node_id`.
    pub fn from_parts(node_id: impl Into<String>, path: Vec<String>) -> Option<Self> {
        let node_id = node_id.into();
        match path.last() {
            Some(last) if *last == node_id => Some(Self { node_id, path }),
            _ => None,
        }
    }

    /// Derive the cold-start route from a URL path.
    ///
    /// The URL only carries the leaf, so the result is always `[leaf]`.
    /// An empty segment resolves to `home`.
    pub fn from_url(url: &str, home: &str) -> Self {
        let leaf = node_id_from_url(url);
        if leaf.is_empty() {
            Self::root(home)
        } else {
            Self::root(leaf)
        }
    }

    /// Identifier of the displayed topic.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Breadcrumb, root first.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Number of breadcrumb levels (at least 1).
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Whether this route is at its breadcrumb root.
    pub fn is_root(&self) -> bool {
        self.path.len() == 1
    }

    /// URL for this route: `/` + node id. Ancestry is never encoded.
    pub fn url(&self) -> String {
        format!("/{}", self.node_id)
    }

    /// Lateral move: swap the tip, keep ancestry and depth.
    pub fn lateral(&self, node_id: impl Into<String>) -> Self {
        let node_id = node_id.into();
        let mut path = self.path.clone();
        if let Some(tip) = path.last_mut() {
            *tip = node_id.clone();
        }
        Self { node_id, path }
    }

    /// Drill-down: append a child, depth + 1.
    pub fn drill(&self, node_id: impl Into<String>) -> Self {
        let node_id = node_id.into();
        let mut path = self.path.clone();
        path.push(node_id.clone());
        Self { node_id, path }
    }

    /// One level toward the root. `None` when already at the root.
    pub fn up(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let mut path = self.path.clone();
        path.pop();
        let node_id = path.last()?.clone();
        Some(Self { node_id, path })
    }

    /// Consume into `(node_id, path)`.
    pub fn into_parts(self) -> (String, Vec<String>) {
        (self.node_id, self.path)
    }
}

impl fmt::Display for RouteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.join(" › "))
    }
}

/// Extract the topic segment from a URL path.
///
/// Strips any query or fragment, one leading `/` and trailing `/`s. The rest
/// is taken verbatim; nested segments are not part of the URL contract and
/// are left in place.
pub fn node_id_from_url(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = &url[..end];
    let path = path.strip_prefix('/').unwrap_or(path);
    path.trim_end_matches('/')
}
