//! Language registry: display metadata for the languages a site can enable.
//!
//! The registry is a read-only catalog. Which languages are actually enabled,
//! and which one is the default, lives in [`LanguageConfig`](super::LanguageConfig);
//! the registry only answers "what is this language called and which flag
//! does it use".

use std::sync::OnceLock;

/// Display metadata for a known language.
#[derive(Debug, Clone)]
pub struct LanguageInfo {
    /// ISO 639-1 language code (e.g., "en", "it")
    pub code: &'static str,

    /// English name of the language (e.g., "Italian")
    pub name: &'static str,

    /// Native name of the language (e.g., "Italiano")
    pub native_name: &'static str,

    /// Flag emoji shown by the language switcher
    pub flag: &'static str,
}

/// Global language catalog.
pub struct LanguageRegistry {
    languages: Vec<LanguageInfo>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: known_languages(),
        })
    }

    /// Get a language's metadata by its code.
    ///
    /// # Returns
    /// * `Some(&LanguageInfo)` if the language is in the catalog
    /// * `None` for codes the catalog does not know (they still route fine,
    ///   they just render with a text label)
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageInfo> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All languages in the catalog, in display order.
    pub fn list_all(&self) -> Vec<&LanguageInfo> {
        self.languages.iter().collect()
    }

    /// English name for a code, falling back to the code itself.
    pub fn name_or_code<'a>(&'a self, code: &'a str) -> &'a str {
        self.get_by_code(code).map(|lang| lang.name).unwrap_or(code)
    }
}

/// Languages offered on the settings screen.
fn known_languages() -> Vec<LanguageInfo> {
    vec![
        LanguageInfo { code: "en", name: "English", native_name: "English", flag: "🇬🇧" },
        LanguageInfo { code: "es", name: "Spanish", native_name: "Español", flag: "🇪🇸" },
        LanguageInfo { code: "fr", name: "French", native_name: "Français", flag: "🇫🇷" },
        LanguageInfo { code: "de", name: "German", native_name: "Deutsch", flag: "🇩🇪" },
        LanguageInfo { code: "it", name: "Italian", native_name: "Italiano", flag: "🇮🇹" },
        LanguageInfo { code: "pt", name: "Portuguese", native_name: "Português", flag: "🇵🇹" },
        LanguageInfo { code: "ru", name: "Russian", native_name: "Русский", flag: "🇷🇺" },
        LanguageInfo { code: "ja", name: "Japanese", native_name: "日本語", flag: "🇯🇵" },
        LanguageInfo { code: "zh", name: "Chinese", native_name: "中文", flag: "🇨🇳" },
        LanguageInfo { code: "ar", name: "Arabic", native_name: "العربية", flag: "🇸🇦" },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LanguageRegistry::get();
        let registry2 = LanguageRegistry::get();

        // Should return the same instance (same memory address)
        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_get_by_code_italian() {
        let info = LanguageRegistry::get().get_by_code("it").expect("Italian is known");
        assert_eq!(info.name, "Italian");
        assert_eq!(info.native_name, "Italiano");
        assert_eq!(info.flag, "🇮🇹");
    }

    #[test]
    fn test_get_by_code_english_uses_uk_flag() {
        let info = LanguageRegistry::get().get_by_code("en").unwrap();
        assert_eq!(info.flag, "🇬🇧");
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        assert!(LanguageRegistry::get().get_by_code("xx").is_none());
    }

    #[test]
    fn test_list_all_has_ten_languages() {
        let all = LanguageRegistry::get().list_all();
        assert_eq!(all.len(), 10);
        assert_eq!(all[0].code, "en");
    }

    #[test]
    fn test_name_or_code_falls_back() {
        let registry = LanguageRegistry::get();
        assert_eq!(registry.name_or_code("es"), "Spanish");
        assert_eq!(registry.name_or_code("nl"), "nl");
    }
}
