//! Content items and the host content store.
//!
//! The router never creates or deletes content. It reads items by id or by
//! default-language slug, and writes a single `language` attribute per item.

use crate::i18n::{LanguageCode, LanguageConfig};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Opaque content identifier (a positive integer in practice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub u64);

impl ContentId {
    /// Parse an id submitted through an admin form.
    ///
    /// Accepts only integers greater than zero (surrounding whitespace is
    /// ignored). Returns `None` for anything else, including negative
    /// numbers and `0`, which means "not set".
    pub fn parse_submitted(raw: &str) -> Option<Self> {
        match raw.trim().parse::<u64>() {
            Ok(0) | Err(_) => None,
            Ok(id) => Some(Self(id)),
        }
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A page owned by the host content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    pub slug: String,
    #[serde(default)]
    pub title: String,
    /// Language tag; absent means the site's default language
    #[serde(default)]
    pub language: Option<LanguageCode>,
}

impl ContentItem {
    pub fn new(id: u64, slug: &str, language: Option<&str>) -> Self {
        Self {
            id: ContentId(id),
            slug: slug.trim_matches('/').to_string(),
            title: String::new(),
            language: language.and_then(|code| LanguageCode::parse(code).ok()),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }
}

/// Host content store consumed by the router.
pub trait ContentStore {
    /// Look up an item by id.
    fn get(&self, id: ContentId) -> Option<ContentItem>;

    /// Whether an id still resolves to a live item.
    fn exists(&self, id: ContentId) -> bool {
        self.get(id).is_some()
    }

    /// Find an item by slug among default-language items only.
    ///
    /// Translated items may have their own slugs, but they are never looked
    /// up by them.
    fn find_by_slug(&self, slug: &str, config: &LanguageConfig) -> Option<ContentItem>;

    /// Write the language attribute of an item. Returns `false` if the item
    /// does not exist.
    fn set_language(&self, id: ContentId, language: LanguageCode) -> bool;

    /// The designated front (home) page, if the site has one.
    fn front_page_id(&self) -> Option<ContentId>;

    /// All items, ordered by id.
    fn items(&self) -> Vec<ContentItem>;
}

/// On-disk site description used to seed a [`MemoryContentStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteFile {
    #[serde(default)]
    pub front_page: Option<ContentId>,
    #[serde(default)]
    pub items: Vec<ContentItem>,
}

/// In-memory content store.
///
/// A store loaded from a site file remembers it, and [`save`](Self::save)
/// writes language assignments back there.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    items: RwLock<BTreeMap<ContentId, ContentItem>>,
    front_page: Option<ContentId>,
    source: Option<PathBuf>,
    save_lock: Mutex<()>,
}

impl MemoryContentStore {
    /// Create a store from items and an optional front page id.
    pub fn new(items: Vec<ContentItem>, front_page: Option<ContentId>) -> Self {
        let items = items.into_iter().map(|item| (item.id, item)).collect();
        Self {
            items: RwLock::new(items),
            front_page,
            source: None,
            save_lock: Mutex::new(()),
        }
    }

    /// Load a store from a JSON site file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read site file at {}", path.display()))?;
        let site: SiteFile = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse site file at {}", path.display()))?;

        info!("Loaded {} content items from {}", site.items.len(), path.display());
        if let Some(front) = site.front_page {
            if !site.items.iter().any(|item| item.id == front) {
                warn!("Front page {} is not in the site file", front);
            }
        }

        let mut store = Self::new(site.items, site.front_page);
        store.source = Some(path.to_path_buf());
        Ok(store)
    }

    /// Write the current items back to the site file the store was loaded
    /// from. Stores built in memory have nothing to write.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.source else {
            return Ok(());
        };

        let _guard = self
            .save_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("Content save lock poisoned"))?;
        let site = SiteFile {
            front_page: self.front_page,
            items: self.items(),
        };
        let json = serde_json::to_vec_pretty(&site).context("Failed to serialize site file")?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        file.write_all(&json)
            .with_context(|| format!("Failed to write site file for {}", path.display()))?;
        file.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace site file at {}", path.display()))?;

        debug!("Saved {} content items to {}", site.items.len(), path.display());
        Ok(())
    }
}

impl ContentStore for MemoryContentStore {
    fn get(&self, id: ContentId) -> Option<ContentItem> {
        let items = self.items.read().ok()?;
        items.get(&id).cloned()
    }

    fn find_by_slug(&self, slug: &str, config: &LanguageConfig) -> Option<ContentItem> {
        let slug = slug.trim_matches('/');
        let items = self.items.read().ok()?;
        items
            .values()
            .find(|item| {
                item.slug == slug
                    && item
                        .language
                        .as_ref()
                        .map_or(true, |lang| config.is_default(lang))
            })
            .cloned()
    }

    fn set_language(&self, id: ContentId, language: LanguageCode) -> bool {
        let Ok(mut items) = self.items.write() else {
            return false;
        };
        match items.get_mut(&id) {
            Some(item) => {
                item.language = Some(language);
                true
            }
            None => false,
        }
    }

    fn front_page_id(&self) -> Option<ContentId> {
        self.front_page
    }

    fn items(&self) -> Vec<ContentItem> {
        self.items
            .read()
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default()
    }
}

/// Outcome of an editor saving a page's language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageAssignment {
    /// Language written to the item
    Assigned(LanguageCode),
    /// Submitted code is not an enabled language; nothing was written
    Rejected(String),
    /// No item with this id
    MissingItem,
}

/// Save a page's language, accepting only enabled languages.
pub fn assign_language(
    store: &impl ContentStore,
    id: ContentId,
    raw_code: &str,
    config: &LanguageConfig,
) -> LanguageAssignment {
    let Some(language) = config.enabled(raw_code).cloned() else {
        debug!("Ignoring language '{}' for item {}: not enabled", raw_code.trim(), id);
        return LanguageAssignment::Rejected(raw_code.trim().to_string());
    };

    if store.set_language(id, language.clone()) {
        info!("Item {} language set to {}", id, language);
        LanguageAssignment::Assigned(language)
    } else {
        LanguageAssignment::MissingItem
    }
}
