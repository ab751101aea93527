use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ContentError;

/// Topic metadata extracted from a content file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMeta {
    pub title: String,

    /// Drafts are listed but not published.
    #[serde(default)]
    pub draft: bool,

    /// Outbound topic ids, in the order they appear in the body.
    #[serde(default)]
    pub links: Vec<String>,
}

/// One addressable topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Topic id, also the URL segment. Opaque.
    pub id: String,
    pub meta: ContentMeta,
}

impl ContentItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            meta: ContentMeta {
                title: title.into(),
                ..Default::default()
            },
        }
    }

    /// Builder: set outbound links.
    pub fn with_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.links = links.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: mark as draft.
    pub fn draft(mut self) -> Self {
        self.meta.draft = true;
        self
    }
}

/// Source of the content listing.
///
/// Ingestion, metadata parsing and link extraction happen behind this trait;
/// the router and tracker never validate ids against it.
pub trait ContentProvider: Send + Sync {
    /// Every item, drafts included, in listing order.
    fn items(&self) -> Vec<ContentItem>;
}

/// TOML listing shape: `[[items]]` tables.
#[derive(Deserialize)]
struct TomlListing {
    #[serde(default)]
    items: Vec<ContentItem>,
}

/// In-memory content listing with id lookup.
///
/// Listing order is preserved. A repeated id replaces the earlier item in
/// place (last one wins).
#[derive(Debug, Clone, Default)]
pub struct ContentIndex {
    items: Vec<ContentItem>,
    by_id: HashMap<String, usize>,
}

impl ContentIndex {
    /// Build from items in listing order.
    pub fn from_items(items: impl IntoIterator<Item = ContentItem>) -> Self {
        let mut index = Self::default();
        for item in items {
            index.insert(item);
        }
        index
    }

    /// Parse a JSON array of items.
    pub fn from_json_str(s: &str) -> Result<Self, ContentError> {
        let items: Vec<ContentItem> = serde_json::from_str(s)?;
        Ok(Self::from_items(items))
    }

    /// Parse a TOML document of `[[items]]` tables.
    pub fn from_toml_str(s: &str) -> Result<Self, ContentError> {
        let listing: TomlListing = toml::from_str(s)?;
        Ok(Self::from_items(listing.items))
    }

    /// Load a listing file, choosing the parser by extension (`.json`, `.toml`).
    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let parse = match format.as_deref() {
            Some("json") => Self::from_json_str,
            Some("toml") => Self::from_toml_str,
            _ => {
                return Err(ContentError::UnsupportedFormat(
                    path.display().to_string(),
                ));
            }
        };
        let content = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let index = parse(&content)?;
        debug!("loaded {} topics from {:?}", index.len(), path);
        Ok(index)
    }

    fn insert(&mut self, item: ContentItem) {
        match self.by_id.get(&item.id) {
            Some(&pos) => {
                warn!(id = %item.id, "duplicate topic id, keeping the later item");
                self.items[pos] = item;
            }
            None => {
                self.by_id.insert(item.id.clone(), self.items.len());
                self.items.push(item);
            }
        }
    }

    /// Look up a topic by id.
    pub fn get(&self, id: &str) -> Option<&ContentItem> {
        self.by_id.get(id).map(|&pos| &self.items[pos])
    }

    /// Check if a topic id is listed (drafts included).
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Title of a topic, if listed.
    pub fn title(&self, id: &str) -> Option<&str> {
        self.get(id).map(|item| item.meta.title.as_str())
    }

    /// Non-draft items, in listing order.
    pub fn published(&self) -> impl Iterator<Item = &ContentItem> {
        self.items.iter().filter(|item| !item.meta.draft)
    }

    /// Outbound links of a topic. Empty for unknown ids.
    ///
    /// Links are returned as written; targets may be unlisted.
    pub fn links_from(&self, id: &str) -> &[String] {
        self.get(id).map(|item| item.meta.links.as_slice()).unwrap_or(&[])
    }

    /// Number of listed topics (drafts included).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the listing is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &ContentItem> {
        self.items.iter()
    }
}

impl ContentProvider for ContentIndex {
    fn items(&self) -> Vec<ContentItem> {
        self.items.clone()
    }
}
