//! Site language configuration: default language, enabled languages and the
//! install path the site is mounted under.

use crate::i18n::{LanguageCode, LanguageError};
use crate::resolver::PrefixMatcher;
use thiserror::Error;

/// Errors produced when building a [`LanguageConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("default language '{0}' is not in the enabled languages")]
    DefaultNotEnabled(String),

    #[error("invalid install path '{0}': must be a plain path without query, fragment or whitespace")]
    InvalidInstallPath(String),

    #[error(transparent)]
    Language(#[from] LanguageError),
}

/// Per-request language settings, loaded once and passed by reference to the
/// resolver and the router.
///
/// Construction enforces `default_language ∈ enabled_languages`, so every
/// fallback chain ends in a language the site actually serves.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    default_language: LanguageCode,
    enabled_languages: Vec<LanguageCode>,
    install_path_prefix: String,
    matcher: PrefixMatcher,
}

impl LanguageConfig {
    /// Build a config from already-parsed codes.
    ///
    /// Enabled languages keep their order; duplicates are dropped.
    /// The install path is normalized to a leading `/` with no trailing `/`
    /// (`""` for a root install).
    pub fn new(
        default_language: LanguageCode,
        enabled_languages: Vec<LanguageCode>,
        install_path_prefix: &str,
    ) -> Result<Self, ConfigError> {
        let mut enabled: Vec<LanguageCode> = Vec::with_capacity(enabled_languages.len());
        for code in enabled_languages {
            if !enabled.contains(&code) {
                enabled.push(code);
            }
        }

        if !enabled.contains(&default_language) {
            return Err(ConfigError::DefaultNotEnabled(default_language.to_string()));
        }

        let install_path_prefix = normalize_install_path(install_path_prefix)?;
        let matcher = PrefixMatcher::new(&install_path_prefix, &enabled);

        Ok(Self {
            default_language,
            enabled_languages: enabled,
            install_path_prefix,
            matcher,
        })
    }

    /// Build a config from raw code strings.
    ///
    /// # Example
    /// ```
    /// use langroute::i18n::LanguageConfig;
    ///
    /// let config = LanguageConfig::from_codes("en", &["en", "it", "es"], "/site/").unwrap();
    /// assert_eq!(config.install_path_prefix(), "/site");
    /// ```
    pub fn from_codes(
        default_language: &str,
        enabled_languages: &[&str],
        install_path_prefix: &str,
    ) -> Result<Self, ConfigError> {
        let default_language = LanguageCode::parse(default_language)?;
        let enabled = enabled_languages
            .iter()
            .map(|code| LanguageCode::parse(code))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(default_language, enabled, install_path_prefix)
    }

    /// The site's default (canonical) language.
    pub fn default_language(&self) -> &LanguageCode {
        &self.default_language
    }

    /// Enabled languages, in configured order.
    pub fn enabled_languages(&self) -> &[LanguageCode] {
        &self.enabled_languages
    }

    /// Normalized install path (`""` or `/something`).
    pub fn install_path_prefix(&self) -> &str {
        &self.install_path_prefix
    }

    /// Look up an enabled language by raw code.
    pub fn enabled(&self, code: &str) -> Option<&LanguageCode> {
        let code = code.trim();
        self.enabled_languages
            .iter()
            .find(|lang| lang.as_str().eq_ignore_ascii_case(code))
    }

    /// Check whether a raw code names an enabled language.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.enabled(code).is_some()
    }

    /// Check whether a code is the default language.
    pub fn is_default(&self, code: &LanguageCode) -> bool {
        *code == self.default_language
    }

    /// Enabled languages other than the default, in configured order.
    pub fn translation_languages(&self) -> impl Iterator<Item = &LanguageCode> {
        self.enabled_languages
            .iter()
            .filter(move |lang| **lang != self.default_language)
    }

    pub(crate) fn matcher(&self) -> &PrefixMatcher {
        &self.matcher
    }
}

fn normalize_install_path(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed
        .chars()
        .any(|c| c == '?' || c == '#' || c.is_whitespace())
    {
        return Err(ConfigError::InvalidInstallPath(raw.to_string()));
    }

    let inner = trimmed.trim_matches('/');
    if inner.is_empty() {
        return Ok(String::new());
    }
    Ok(format!("/{}", inner))
}
