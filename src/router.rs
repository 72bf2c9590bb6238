//! Translation router: maps between canonical (default-language) content and
//! its per-language counterparts, and builds language-prefixed URLs.
//!
//! Missing translations are a normal state, not an error. Every lookup
//! degrades to a defined fallback: the language homepage, the canonical item,
//! or the item itself.

use crate::content::{ContentId, ContentItem, ContentStore};
use crate::i18n::{LanguageCode, LanguageConfig};
use crate::links::TranslationLinks;
use tracing::debug;

/// Request-scoped view over config, link table and content store.
pub struct TranslationRouter<'a, C: ContentStore> {
    config: &'a LanguageConfig,
    links: &'a TranslationLinks,
    content: &'a C,
}

impl<'a, C: ContentStore> TranslationRouter<'a, C> {
    pub fn new(config: &'a LanguageConfig, links: &'a TranslationLinks, content: &'a C) -> Self {
        Self {
            config,
            links,
            content,
        }
    }

    pub fn config(&self) -> &LanguageConfig {
        self.config
    }

    /// Language of an item; untagged items are in the default language.
    pub fn language_of(&self, item: &ContentItem) -> LanguageCode {
        item.language
            .clone()
            .unwrap_or_else(|| self.config.default_language().clone())
    }

    /// Live translation of a canonical item into `target`.
    ///
    /// Stored ids that no longer resolve to an item count as "no translation".
    pub fn translation_of(&self, canonical: ContentId, target: &LanguageCode) -> Option<ContentId> {
        let id = self.links.translation(canonical, target)?;
        if self.content.exists(id) {
            Some(id)
        } else {
            debug!(
                "Translation {} of item {} into {} is dangling",
                id, canonical, target
            );
            None
        }
    }

    /// Canonical item for `id`.
    ///
    /// A linked translation maps to its canonical entry; a default-language
    /// item is its own canonical.
    pub fn canonical_of(&self, id: ContentId) -> Option<ContentId> {
        if let Some(canonical) = self.links.canonical_for(id) {
            return Some(canonical);
        }

        let item = self.content.get(id)?;
        if self.config.is_default(&self.language_of(&item)) {
            Some(id)
        } else {
            None
        }
    }

    /// Homepage of a language: `{install}/{lang}/`.
    pub fn home_url(&self, target: &LanguageCode) -> String {
        format!("{}/{}/", self.config.install_path_prefix(), target)
    }

    /// URL of `item` in the `target` language.
    ///
    /// Translated pages are always addressed by their canonical item's slug;
    /// only the language prefix changes.
    pub fn url_for(&self, item: &ContentItem, target: &LanguageCode) -> String {
        if self.is_front_page(item.id) {
            return self.home_url(target);
        }

        if self.config.is_default(&self.language_of(item)) {
            return self.canonical_url(item, target);
        }

        let canonical = self
            .canonical_of(item.id)
            .and_then(|id| self.content.get(id));
        match canonical {
            Some(canonical) if self.is_front_page(canonical.id) => self.home_url(target),
            Some(canonical) => self.canonical_url(&canonical, target),
            None => {
                debug!("Item {} has no canonical page, linking to {} home", item.id, target);
                self.home_url(target)
            }
        }
    }

    /// Address under which `item` is served in the `target` language.
    ///
    /// Unlike [`url_for`](Self::url_for), a missing translation keeps the
    /// canonical slug under the target prefix rather than falling back to the
    /// language homepage, since [`resolve_for_serving`](Self::resolve_for_serving)
    /// serves the canonical item there.
    pub fn serving_url(&self, item: &ContentItem, target: &LanguageCode) -> String {
        if self.config.is_default(target) {
            return self.url_for(item, target);
        }

        let canonical = self
            .canonical_of(item.id)
            .and_then(|id| self.content.get(id));
        match canonical {
            Some(canonical) if !self.is_front_page(canonical.id) && !self.is_front_page(item.id) => {
                format!(
                    "{}/{}/{}/",
                    self.config.install_path_prefix(),
                    target,
                    canonical.slug
                )
            }
            _ => self.home_url(target),
        }
    }

    /// Content to serve for a language and an optional requested slug.
    ///
    /// Returns `None` only when there is nothing to serve at all (unknown
    /// slug, or no front page configured).
    pub fn resolve_for_serving(&self, language: &LanguageCode, slug: Option<&str>) -> Option<ContentId> {
        let canonical = match slug.map(|s| s.trim_matches('/')).filter(|s| !s.is_empty()) {
            None => self.content.front_page_id()?,
            Some(slug) => self.content.find_by_slug(slug, self.config)?.id,
        };

        if self.config.is_default(language) {
            return Some(canonical);
        }

        match self.translation_of(canonical, language) {
            Some(translation) => Some(translation),
            None => {
                debug!(
                    "No {} translation for item {}, serving canonical",
                    language, canonical
                );
                Some(canonical)
            }
        }
    }

    fn canonical_url(&self, canonical: &ContentItem, target: &LanguageCode) -> String {
        if self.config.is_default(target) {
            return self.permalink(canonical);
        }

        match self.translation_of(canonical.id, target) {
            Some(_) => format!(
                "{}/{}/{}/",
                self.config.install_path_prefix(),
                target,
                canonical.slug
            ),
            None => self.home_url(target),
        }
    }

    fn permalink(&self, item: &ContentItem) -> String {
        format!("{}/{}/", self.config.install_path_prefix(), item.slug)
    }

    fn is_front_page(&self, id: ContentId) -> bool {
        self.content.front_page_id() == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemoryContentStore;

    fn config() -> LanguageConfig {
        LanguageConfig::from_codes("en", &["en", "it", "es"], "/site").unwrap()
    }

    fn lang(code: &str) -> LanguageCode {
        LanguageCode::parse(code).unwrap()
    }

    fn content() -> MemoryContentStore {
        MemoryContentStore::new(
            vec![
                ContentItem::new(1, "home", None),
                ContentItem::new(2, "casa", Some("it")),
                ContentItem::new(5, "about-us", None),
                ContentItem::new(6, "contact", Some("en")),
                ContentItem::new(12, "chi-siamo", Some("it")),
                ContentItem::new(20, "orphan", Some("es")),
            ],
            Some(ContentId(1)),
        )
    }

    fn links() -> TranslationLinks {
        let mut links = TranslationLinks::new();
        links.insert(ContentId(1), lang("it"), ContentId(2));
        links.insert(ContentId(5), lang("it"), ContentId(12));
        // Dangling: item 99 does not exist
        links.insert(ContentId(6), lang("es"), ContentId(99));
        links
    }

    // ==================== language_of Tests ====================

    #[test]
    fn test_language_of_defaults_untagged_items() {
        let (config, links, content) = (config(), links(), content());
        let router = TranslationRouter::new(&config, &links, &content);
        assert_eq!(router.language_of(&ContentItem::new(5, "about-us", None)), lang("en"));
        assert_eq!(router.language_of(&ContentItem::new(12, "chi-siamo", Some("it"))), lang("it"));
    }

    // ==================== translation_of / canonical_of Tests ====================

    #[test]
    fn test_translation_of_existing_link() {
        let (config, links, content) = (config(), links(), content());
        let router = TranslationRouter::new(&config, &links, &content);
        assert_eq!(router.translation_of(ContentId(5), &lang("it")), Some(ContentId(12)));
        assert_eq!(router.translation_of(ContentId(5), &lang("es")), None);
    }

    #[test]
    fn test_translation_of_dangling_link_is_none() {
        let (config, links, content) = (config(), links(), content());
        let router = TranslationRouter::new(&config, &links, &content);
        assert_eq!(router.translation_of(ContentId(6), &lang("es")), None);
    }

    #[test]
    fn test_canonical_of() {
        let (config, links, content) = (config(), links(), content());
        let router = TranslationRouter::new(&config, &links, &content);
        assert_eq!(router.canonical_of(ContentId(12)), Some(ContentId(5)));
        assert_eq!(router.canonical_of(ContentId(5)), Some(ContentId(5)));
        assert_eq!(router.canonical_of(ContentId(20)), None);
        assert_eq!(router.canonical_of(ContentId(404)), None);
    }

    // ==================== url_for Tests ====================

    #[test]
    fn test_url_for_canonical_with_translation() {
        let (config, links, content) = (config(), links(), content());
        let router = TranslationRouter::new(&config, &links, &content);
        let item = content.get(ContentId(5)).unwrap();
        assert_eq!(router.url_for(&item, &lang("it")), "/site/it/about-us/");
    }

    #[test]
    fn test_url_for_canonical_without_translation_falls_back_home() {
        let (config, links, content) = (config(), links(), content());
        let router = TranslationRouter::new(&config, &links, &content);
        let item = content.get(ContentId(5)).unwrap();
        assert_eq!(router.url_for(&item, &lang("es")), "/site/es/");
    }

    #[test]
    fn test_url_for_own_language_is_permalink() {
        let (config, links, content) = (config(), links(), content());
        let router = TranslationRouter::new(&config, &links, &content);
        let item = content.get(ContentId(5)).unwrap();
        assert_eq!(router.url_for(&item, &lang("en")), "/site/about-us/");
    }

    #[test]
    fn test_url_for_translation_back_to_default() {
        let (config, links, content) = (config(), links(), content());
        let router = TranslationRouter::new(&config, &links, &content);
        let item = content.get(ContentId(12)).unwrap();
        assert_eq!(router.url_for(&item, &lang("en")), "/site/about-us/");
        assert_eq!(router.url_for(&item, &lang("it")), "/site/it/about-us/");
        assert_eq!(router.url_for(&item, &lang("es")), "/site/es/");
    }

    #[test]
    fn test_url_for_unlinked_translation_falls_back_home() {
        let (config, links, content) = (config(), links(), content());
        let router = TranslationRouter::new(&config, &links, &content);
        let item = content.get(ContentId(20)).unwrap();
        assert_eq!(router.url_for(&item, &lang("en")), "/site/en/");
        assert_eq!(router.url_for(&item, &lang("it")), "/site/it/");
    }

    #[test]
    fn test_url_for_front_page_always_language_home() {
        let (config, links, content) = (config(), links(), content());
        let router = TranslationRouter::new(&config, &links, &content);
        let home = content.get(ContentId(1)).unwrap();
        assert_eq!(router.url_for(&home, &lang("es")), "/site/es/");
        assert_eq!(router.url_for(&home, &lang("en")), "/site/en/");

        // The translated front page also links to language homes
        let casa = content.get(ContentId(2)).unwrap();
        assert_eq!(router.url_for(&casa, &lang("en")), "/site/en/");
    }

    #[test]
    fn test_url_for_root_install() {
        let config = LanguageConfig::from_codes("en", &["en", "it"], "").unwrap();
        let (links, content) = (links(), content());
        let router = TranslationRouter::new(&config, &links, &content);
        let item = content.get(ContentId(5)).unwrap();
        assert_eq!(router.url_for(&item, &lang("it")), "/it/about-us/");
        assert_eq!(router.url_for(&item, &lang("en")), "/about-us/");
    }

    // ==================== serving_url Tests ====================

    #[test]
    fn test_serving_url_keeps_slug_without_translation() {
        let (config, links, content) = (config(), links(), content());
        let router = TranslationRouter::new(&config, &links, &content);
        let item = content.get(ContentId(5)).unwrap();
        assert_eq!(router.serving_url(&item, &lang("es")), "/site/es/about-us/");
        assert_eq!(router.serving_url(&item, &lang("it")), "/site/it/about-us/");
        assert_eq!(router.serving_url(&item, &lang("en")), "/site/about-us/");
    }

    #[test]
    fn test_serving_url_front_page_and_orphans_go_home() {
        let (config, links, content) = (config(), links(), content());
        let router = TranslationRouter::new(&config, &links, &content);
        let home = content.get(ContentId(1)).unwrap();
        assert_eq!(router.serving_url(&home, &lang("es")), "/site/es/");
        let orphan = content.get(ContentId(20)).unwrap();
        assert_eq!(router.serving_url(&orphan, &lang("it")), "/site/it/");
    }

    // ==================== resolve_for_serving Tests ====================

    #[test]
    fn test_resolve_home_default_language() {
        let (config, links, content) = (config(), links(), content());
        let router = TranslationRouter::new(&config, &links, &content);
        assert_eq!(router.resolve_for_serving(&lang("en"), None), Some(ContentId(1)));
    }

    #[test]
    fn test_resolve_home_translated() {
        let (config, links, content) = (config(), links(), content());
        let router = TranslationRouter::new(&config, &links, &content);
        assert_eq!(router.resolve_for_serving(&lang("it"), None), Some(ContentId(2)));
    }

    #[test]
    fn test_resolve_home_without_translation_serves_default_home() {
        let config = LanguageConfig::from_codes("en", &["en", "it", "fr"], "").unwrap();
        let (links, content) = (links(), content());
        let router = TranslationRouter::new(&config, &links, &content);
        assert_eq!(router.resolve_for_serving(&lang("fr"), None), Some(ContentId(1)));
    }

    #[test]
    fn test_resolve_slug_translated() {
        let (config, links, content) = (config(), links(), content());
        let router = TranslationRouter::new(&config, &links, &content);
        assert_eq!(
            router.resolve_for_serving(&lang("it"), Some("about-us")),
            Some(ContentId(12))
        );
        assert_eq!(
            router.resolve_for_serving(&lang("en"), Some("about-us")),
            Some(ContentId(5))
        );
    }

    #[test]
    fn test_resolve_slug_without_translation_serves_canonical() {
        let (config, links, content) = (config(), links(), content());
        let router = TranslationRouter::new(&config, &links, &content);
        assert_eq!(
            router.resolve_for_serving(&lang("es"), Some("about-us")),
            Some(ContentId(5))
        );
        // Dangling link falls back too
        assert_eq!(
            router.resolve_for_serving(&lang("es"), Some("contact")),
            Some(ContentId(6))
        );
    }

    #[test]
    fn test_resolve_translated_slug_is_not_looked_up() {
        let (config, links, content) = (config(), links(), content());
        let router = TranslationRouter::new(&config, &links, &content);
        assert_eq!(router.resolve_for_serving(&lang("it"), Some("chi-siamo")), None);
        assert_eq!(router.resolve_for_serving(&lang("en"), Some("missing")), None);
    }

    #[test]
    fn test_resolve_empty_slug_is_home() {
        let (config, links, content) = (config(), links(), content());
        let router = TranslationRouter::new(&config, &links, &content);
        assert_eq!(router.resolve_for_serving(&lang("en"), Some("/")), Some(ContentId(1)));
    }
}
