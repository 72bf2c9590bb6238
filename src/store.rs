//! Link table persistence.
//!
//! The table is one value: readers load it whole at request start and admin
//! saves replace it whole. Two concurrent saves race with last-write-wins.

use crate::links::TranslationLinks;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("link table I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("link table at {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("link table lock poisoned")]
    Poisoned,
}

/// Storage for the whole translation link table.
pub trait LinkTableStore: Send + Sync {
    /// Load the current table.
    fn load(&self) -> Result<TranslationLinks, StoreError>;

    /// Atomically replace the stored table.
    fn replace(&self, links: &TranslationLinks) -> Result<(), StoreError>;
}

/// In-memory link table.
#[derive(Debug, Default)]
pub struct MemoryLinkStore {
    links: RwLock<TranslationLinks>,
}

impl MemoryLinkStore {
    pub fn new(links: TranslationLinks) -> Self {
        Self {
            links: RwLock::new(links),
        }
    }
}

impl LinkTableStore for MemoryLinkStore {
    fn load(&self) -> Result<TranslationLinks, StoreError> {
        self.links
            .read()
            .map(|links| links.clone())
            .map_err(|_| StoreError::Poisoned)
    }

    fn replace(&self, links: &TranslationLinks) -> Result<(), StoreError> {
        let mut guard = self.links.write().map_err(|_| StoreError::Poisoned)?;
        *guard = links.clone();
        Ok(())
    }
}

/// Link table stored as a JSON file.
///
/// Saves write a uniquely named sibling temp file and rename it over the
/// target, so a reader sees either the old table or the new one and
/// concurrent saves resolve last-write-wins.
#[derive(Debug, Clone)]
pub struct JsonFileLinkStore {
    path: PathBuf,
}

impl JsonFileLinkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl LinkTableStore for JsonFileLinkStore {
    fn load(&self) -> Result<TranslationLinks, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No link table at {}, starting empty", self.path.display());
                return Ok(TranslationLinks::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        if raw.trim().is_empty() {
            return Ok(TranslationLinks::new());
        }

        serde_json::from_str(&raw).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn replace(&self, links: &TranslationLinks) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(links).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        // One temp file per save, in the target's directory
        let mut file = NamedTempFile::new_in(self.parent_dir()).map_err(|e| self.io_error(e))?;
        file.write_all(&json).map_err(|e| self.io_error(e))?;
        file.as_file().sync_all().map_err(|e| self.io_error(e))?;
        file.persist(&self.path).map_err(|e| self.io_error(e.error))?;
        info!(
            "Saved {} translation link entries to {}",
            links.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentId;
    use crate::i18n::LanguageCode;
    use tempfile::TempDir;

    fn sample_links() -> TranslationLinks {
        let mut links = TranslationLinks::new();
        links.insert(ContentId(5), LanguageCode::parse("it").unwrap(), ContentId(12));
        links
    }

    // ==================== MemoryLinkStore Tests ====================

    #[test]
    fn test_memory_store_replace_and_load() {
        let store = MemoryLinkStore::default();
        assert!(store.load().unwrap().is_empty());

        store.replace(&sample_links()).unwrap();
        assert_eq!(store.load().unwrap(), sample_links());

        store.replace(&TranslationLinks::new()).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    // ==================== JsonFileLinkStore Tests ====================

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileLinkStore::new(dir.path().join("links.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_replace_then_load() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileLinkStore::new(dir.path().join("links.json"));

        store.replace(&sample_links()).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, sample_links());
        assert_eq!(loaded.canonical_for(ContentId(12)), Some(ContentId(5)));

        // No temp file left behind
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_file_store_replace_overwrites_whole_table() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileLinkStore::new(dir.path().join("links.json"));

        store.replace(&sample_links()).unwrap();
        let mut other = TranslationLinks::new();
        other.insert(ContentId(7), LanguageCode::parse("es").unwrap(), ContentId(8));
        store.replace(&other).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.translations(ContentId(5)).is_none());
    }

    #[test]
    fn test_file_store_invalid_json() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("links.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = JsonFileLinkStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
    }

    #[test]
    fn test_file_store_concurrent_saves_never_fail_or_tear() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = std::sync::Arc::new(JsonFileLinkStore::new(dir.path().join("links.json")));

        let mut big = TranslationLinks::new();
        for canonical in 1..=2000u64 {
            big.insert(
                ContentId(canonical),
                LanguageCode::parse("it").unwrap(),
                ContentId(canonical + 10_000),
            );
        }
        store.replace(&big).unwrap();

        let writers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                let big = big.clone();
                std::thread::spawn(move || {
                    (0..25).filter(|_| store.replace(&big).is_err()).count()
                })
            })
            .collect();

        let reader = {
            let store = store.clone();
            std::thread::spawn(move || {
                (0..100)
                    .filter(|_| !matches!(store.load(), Ok(links) if links.len() == 2000))
                    .count()
            })
        };

        let failed_saves: usize = writers.into_iter().map(|w| w.join().unwrap()).sum();
        assert_eq!(failed_saves, 0);
        assert_eq!(reader.join().unwrap(), 0);

        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
