//! Link table report: what is linked, what is missing, what is dangling.

use crate::content::{ContentId, ContentStore};
use crate::i18n::{LanguageCode, LanguageConfig, LanguageRegistry};
use crate::links::TranslationLinks;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// State of one (canonical, language) slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LinkStatus {
    Linked { id: ContentId, slug: String },
    Dangling { id: ContentId },
    NotSet,
}

/// One canonical entry of the link table.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub canonical: ContentId,
    /// Canonical slug, `None` if the canonical item itself is gone
    pub slug: Option<String>,
    pub languages: BTreeMap<LanguageCode, LinkStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkReport {
    /// Pages per enabled language
    pub page_counts: BTreeMap<LanguageCode, usize>,
    pub rows: Vec<ReportRow>,
}

impl LinkReport {
    pub fn build(links: &TranslationLinks, content: &impl ContentStore, config: &LanguageConfig) -> Self {
        let mut page_counts: BTreeMap<LanguageCode, usize> = config
            .enabled_languages()
            .iter()
            .map(|lang| (lang.clone(), 0))
            .collect();
        for item in content.items() {
            let language = item
                .language
                .unwrap_or_else(|| config.default_language().clone());
            if let Some(count) = page_counts.get_mut(&language) {
                *count += 1;
            }
        }

        let rows = links
            .iter()
            .map(|(canonical, translations)| {
                let languages = config
                    .translation_languages()
                    .map(|language| {
                        let status = match translations.get(language) {
                            None => LinkStatus::NotSet,
                            Some(id) => match content.get(*id) {
                                Some(item) => LinkStatus::Linked { id: *id, slug: item.slug },
                                None => LinkStatus::Dangling { id: *id },
                            },
                        };
                        (language.clone(), status)
                    })
                    .collect();

                ReportRow {
                    canonical: *canonical,
                    slug: content.get(*canonical).map(|item| item.slug),
                    languages,
                }
            })
            .collect();

        Self { page_counts, rows }
    }

    /// Number of stored links pointing at missing items.
    pub fn dangling_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.languages.values())
            .filter(|status| matches!(status, LinkStatus::Dangling { .. }))
            .count()
    }

    /// Plain-text rendering for terminals.
    pub fn render_text(&self) -> String {
        let registry = LanguageRegistry::get();
        let mut out = String::new();

        let counts = self
            .page_counts
            .iter()
            .map(|(lang, count)| format!("{}: {}", registry.name_or_code(lang.as_str()), count))
            .collect::<Vec<_>>()
            .join(" | ");
        let _ = writeln!(out, "Page counts: {}", counts);

        if self.rows.is_empty() {
            let _ = writeln!(out, "No translation links have been saved yet.");
            return out;
        }

        let _ = writeln!(out, "{} translation link entries:", self.rows.len());
        for row in &self.rows {
            match &row.slug {
                Some(slug) => {
                    let _ = writeln!(out, "- {} (ID: {})", slug, row.canonical);
                }
                None => {
                    let _ = writeln!(out, "- ID: {} (page not found)", row.canonical);
                }
            }
            for (lang, status) in &row.languages {
                let line = match status {
                    LinkStatus::Linked { id, slug } => format!("{} (ID: {})", slug, id),
                    LinkStatus::Dangling { id } => format!("ID: {} (page not found)", id),
                    LinkStatus::NotSet => "Not set".to_string(),
                };
                let _ = writeln!(out, "    {}: {}", registry.name_or_code(lang.as_str()), line);
            }
        }
        out
    }
}
