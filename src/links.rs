//! Translation link table: canonical item → { language → translation item }.
//!
//! The table is replaced as a whole on every admin save. A reverse index
//! (translation → canonical) is kept alongside so reverse lookups do not scan
//! the whole table.

use crate::content::ContentId;
use crate::i18n::{LanguageCode, LanguageConfig};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Per-canonical translations, keyed by language.
pub type Translations = BTreeMap<LanguageCode, ContentId>;

/// Serialized shape of the table: `{"5": {"it": 12, "es": 14}}`.
pub type LinkEntries = BTreeMap<ContentId, Translations>;

/// Raw admin submission, before sanitization.
///
/// Both levels are keyed by whatever the form sent. Values may be strings
/// (`"12"`) or numbers (`12`); empty strings mean "no translation".
pub type LinkSubmission = BTreeMap<String, BTreeMap<String, serde_json::Value>>;

/// Strongly typed translation link table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LinkEntries", into = "LinkEntries")]
pub struct TranslationLinks {
    entries: LinkEntries,
    reverse: HashMap<ContentId, ContentId>,
}

impl TranslationLinks {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from entries.
    ///
    /// A translation id belongs to one canonical item only: when several
    /// entries claim it, the lowest canonical id keeps it and the other
    /// claims are dropped. Canonical ids left with no translations are
    /// dropped too.
    pub fn from_entries(mut entries: LinkEntries) -> Self {
        let mut claimed: HashMap<ContentId, ContentId> = HashMap::new();
        let mut conflicts = 0usize;

        for (canonical, translations) in entries.iter_mut() {
            translations.retain(|language, translation| {
                match claimed.get(&*translation) {
                    Some(owner) if owner != canonical => {
                        debug!(
                            "Dropping {} link {} -> {}: already a translation of {}",
                            language, canonical, translation, owner
                        );
                        conflicts += 1;
                        false
                    }
                    _ => {
                        claimed.insert(*translation, *canonical);
                        true
                    }
                }
            });
        }
        entries.retain(|_, translations| !translations.is_empty());

        if conflicts > 0 {
            debug!("Dropped {} conflicting translation link(s)", conflicts);
        }

        let mut links = Self {
            entries,
            reverse: HashMap::new(),
        };
        links.rebuild_reverse();
        links
    }

    /// Sanitize an admin submission into a table.
    ///
    /// - canonical and translation ids must be integers greater than zero;
    ///   anything else is discarded
    /// - language keys must be enabled, non-default languages
    /// - a translation id already claimed by a lower canonical id is dropped
    /// - canonical entries left without translations are dropped
    ///
    /// Nothing here fails: malformed input is simply not persisted.
    pub fn from_submission(submission: &LinkSubmission, config: &LanguageConfig) -> Self {
        let mut entries = LinkEntries::new();
        let mut discarded = 0usize;

        for (raw_canonical, raw_translations) in submission {
            let Some(canonical) = ContentId::parse_submitted(raw_canonical) else {
                discarded += 1;
                continue;
            };

            let mut translations = Translations::new();
            for (raw_language, raw_id) in raw_translations {
                let language = match config.enabled(raw_language) {
                    Some(language) if !config.is_default(language) => language.clone(),
                    _ => {
                        discarded += 1;
                        continue;
                    }
                };

                match submitted_id(raw_id) {
                    Some(id) => {
                        translations.insert(language, id);
                    }
                    None if is_blank(raw_id) => {}
                    None => discarded += 1,
                }
            }

            if !translations.is_empty() {
                entries.insert(canonical, translations);
            }
        }

        if discarded > 0 {
            debug!("Discarded {} malformed translation link value(s)", discarded);
        }

        Self::from_entries(entries)
    }

    /// Link `translation` as the `language` version of `canonical`.
    ///
    /// A translation already linked to another canonical item is moved, so
    /// it never has two owners. Returns the previously linked id for the
    /// pair, if any.
    pub fn insert(
        &mut self,
        canonical: ContentId,
        language: LanguageCode,
        translation: ContentId,
    ) -> Option<ContentId> {
        if let Some(owner) = self.canonical_for(translation).filter(|owner| *owner != canonical) {
            if let Some(translations) = self.entries.get_mut(&owner) {
                translations.retain(|_, id| *id != translation);
                if translations.is_empty() {
                    self.entries.remove(&owner);
                }
            }
        }

        let previous = self
            .entries
            .entry(canonical)
            .or_default()
            .insert(language, translation);
        self.rebuild_reverse();
        previous
    }

    /// Remove one translation link, dropping the canonical entry if it
    /// becomes empty.
    pub fn remove(&mut self, canonical: ContentId, language: &LanguageCode) -> Option<ContentId> {
        let translations = self.entries.get_mut(&canonical)?;
        let removed = translations.remove(language);
        if translations.is_empty() {
            self.entries.remove(&canonical);
        }
        self.rebuild_reverse();
        removed
    }

    /// Stored translation of a canonical item, without existence checks.
    pub fn translation(&self, canonical: ContentId, language: &LanguageCode) -> Option<ContentId> {
        self.entries.get(&canonical)?.get(language).copied()
    }

    /// All stored translations of a canonical item.
    pub fn translations(&self, canonical: ContentId) -> Option<&Translations> {
        self.entries.get(&canonical)
    }

    /// Canonical item that lists `id` as one of its translations.
    pub fn canonical_for(&self, id: ContentId) -> Option<ContentId> {
        self.reverse.get(&id).copied()
    }

    /// Iterate over `(canonical, translations)` in canonical id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ContentId, &Translations)> {
        self.entries.iter()
    }

    /// Number of canonical entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn rebuild_reverse(&mut self) {
        self.reverse.clear();
        for (canonical, translations) in &self.entries {
            for translation in translations.values() {
                self.reverse.entry(*translation).or_insert(*canonical);
            }
        }
    }
}

impl From<LinkEntries> for TranslationLinks {
    fn from(entries: LinkEntries) -> Self {
        Self::from_entries(entries)
    }
}

impl From<TranslationLinks> for LinkEntries {
    fn from(links: TranslationLinks) -> Self {
        links.entries
    }
}

fn submitted_id(value: &serde_json::Value) -> Option<ContentId> {
    match value {
        serde_json::Value::String(raw) => ContentId::parse_submitted(raw),
        serde_json::Value::Number(number) => number.as_u64().filter(|id| *id > 0).map(ContentId),
        _ => None,
    }
}

fn is_blank(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(raw) => raw.trim().is_empty(),
        _ => false,
    }
}
