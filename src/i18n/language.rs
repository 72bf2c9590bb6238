//! Language code: validated, normalized language identifier.
//!
//! Codes are the tokens that appear as the first path segment of a
//! language-prefixed URL (`/it/about-us/`), as keys of the translation link
//! table, and as the value of the language cookie.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors produced when parsing a language code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LanguageError {
    #[error("language code is empty")]
    Empty,

    #[error("invalid language code: '{0}'")]
    Invalid(String),
}

/// A validated language code (e.g., "en", "it", "pt-br").
///
/// Codes are lower-cased on parse so `"IT"` and `"it"` are the same language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageCode(String);

static CODE_REGEX: OnceLock<Regex> = OnceLock::new();

fn code_regex() -> &'static Regex {
    CODE_REGEX.get_or_init(|| {
        Regex::new(r"^[a-z]{2,3}(-[a-z0-9]{2,8})?$").expect("language code pattern is valid")
    })
}

impl LanguageCode {
    /// Parse and normalize a language code.
    ///
    /// # Example
    /// ```
    /// use langroute::i18n::LanguageCode;
    ///
    /// let italian = LanguageCode::parse(" IT ").unwrap();
    /// assert_eq!(italian.as_str(), "it");
    /// ```
    pub fn parse(raw: &str) -> Result<Self, LanguageError> {
        let normalized = raw.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(LanguageError::Empty);
        }
        if !code_regex().is_match(&normalized) {
            return Err(LanguageError::Invalid(raw.trim().to_string()));
        }
        Ok(Self(normalized))
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-cased code, used for text flags and labels (e.g., "IT").
    pub fn label(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = LanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for LanguageCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for LanguageCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for LanguageCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LanguageCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        LanguageCode::parse(&raw).map_err(serde::de::Error::custom)
    }
}
