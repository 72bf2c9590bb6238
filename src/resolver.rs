//! Language resolver: decides the active language of a request.
//!
//! Resolution order is path prefix, then the language cookie, then the site
//! default. Detection is a pure function of its inputs; persisting the
//! language cookie is left to the caller through [`LanguageCookie`].

use crate::i18n::{LanguageCode, LanguageConfig};
use chrono::{DateTime, Duration, Utc};
use regex::Regex;

/// Name of the cookie that remembers the visitor's last explicit language.
pub const LANGUAGE_COOKIE: &str = "site_language";

/// Lifetime of the language cookie (30 days).
pub const LANGUAGE_COOKIE_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

/// Matches `^/(L)(/|$)` against a path with the install prefix removed,
/// where `L` is the alternation of enabled language codes.
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
    install_prefix: String,
    pattern: Option<Regex>,
}

impl PrefixMatcher {
    /// Compile a matcher for the given install prefix and language codes.
    ///
    /// An empty code list yields a matcher that never matches.
    pub fn new(install_prefix: &str, codes: &[LanguageCode]) -> Self {
        let pattern = if codes.is_empty() {
            None
        } else {
            let alternation = codes
                .iter()
                .map(|code| regex::escape(code.as_str()))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!("^/({})(/|$)", alternation)).ok()
        };

        Self {
            install_prefix: install_prefix.to_string(),
            pattern,
        }
    }

    /// Split a request path into `(language code, remainder)`.
    ///
    /// The remainder is what follows the language segment, without its
    /// leading slash (`"about-us/"` for `/site/it/about-us/`).
    pub fn split<'a>(&self, request_path: &'a str) -> Option<(&'a str, &'a str)> {
        let path = strip_query(request_path);
        let rest = path.strip_prefix(self.install_prefix.as_str())?;
        let captures = self.pattern.as_ref()?.captures(rest)?;
        let code = captures.get(1)?;
        let whole = captures.get(0)?;
        Some((code.as_str(), &rest[whole.end()..]))
    }
}

/// Instruction to persist the detected language in a long-lived cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCookie {
    pub name: &'static str,
    pub value: LanguageCode,
    pub max_age: Duration,
    pub path: &'static str,
}

impl LanguageCookie {
    fn remember(language: &LanguageCode) -> Self {
        Self {
            name: LANGUAGE_COOKIE,
            value: language.clone(),
            max_age: Duration::seconds(LANGUAGE_COOKIE_MAX_AGE_SECS),
            path: "/",
        }
    }

    /// Render the `Set-Cookie` header value using the current time.
    pub fn header_value(&self) -> String {
        self.header_value_at(Utc::now())
    }

    /// Render the `Set-Cookie` header value with expiry relative to `now`.
    pub fn header_value_at(&self, now: DateTime<Utc>) -> String {
        let expires = now + self.max_age;
        format!(
            "{}={}; Max-Age={}; Expires={}; Path={}; SameSite=Lax",
            self.name,
            self.value,
            self.max_age.num_seconds(),
            expires.format("%a, %d %b %Y %H:%M:%S GMT"),
            self.path
        )
    }
}

/// Outcome of language detection for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Active language for this request
    pub language: LanguageCode,

    /// Whether the language came from an explicit path prefix
    pub sourced_from_path: bool,

    /// Cookie the caller should set (only when sourced from the path)
    pub cookie: Option<LanguageCookie>,
}

/// Determine the active language of a request.
///
/// 1. An enabled language prefix right after the install path wins.
/// 2. Otherwise an enabled language stored in the cookie.
/// 3. Otherwise the default language.
///
/// # Example
/// ```
/// use langroute::i18n::LanguageConfig;
/// use langroute::resolver::detect;
///
/// let config = LanguageConfig::from_codes("en", &["en", "it", "es"], "/site").unwrap();
/// let detection = detect("/site/it/about-us/", Some("es"), &config);
/// assert_eq!(detection.language.as_str(), "it");
/// assert!(detection.sourced_from_path);
/// ```
pub fn detect(request_path: &str, cookie_language: Option<&str>, config: &LanguageConfig) -> Detection {
    if let Some((language, _)) = split_language_prefix(request_path, config) {
        let cookie = LanguageCookie::remember(&language);
        return Detection {
            language,
            sourced_from_path: true,
            cookie: Some(cookie),
        };
    }

    if let Some(language) = cookie_language.and_then(|code| config.enabled(code)) {
        return Detection {
            language: language.clone(),
            sourced_from_path: false,
            cookie: None,
        };
    }

    Detection {
        language: config.default_language().clone(),
        sourced_from_path: false,
        cookie: None,
    }
}

/// Split a request path into its language prefix and the remainder.
pub fn split_language_prefix<'a>(
    request_path: &'a str,
    config: &LanguageConfig,
) -> Option<(LanguageCode, &'a str)> {
    let (code, rest) = config.matcher().split(request_path)?;
    let language = config.enabled(code)?.clone();
    Some((language, rest))
}

/// Whether the path carries an enabled language prefix.
///
/// Hosts use this to skip their own canonical-URL redirects for language
/// URLs, which they would otherwise rewrite to the unprefixed permalink.
pub fn has_language_prefix(request_path: &str, config: &LanguageConfig) -> bool {
    config.matcher().split(request_path).is_some()
}

/// Slug requested by a path, with install path and language prefix removed.
///
/// Returns `None` for the home route. Nested paths keep their inner slashes
/// (`/it/parent/child/` → `parent/child`).
pub fn requested_slug(request_path: &str, config: &LanguageConfig) -> Option<String> {
    let rest = match split_language_prefix(request_path, config) {
        Some((_, rest)) => rest,
        None => {
            let path = strip_query(request_path);
            path.strip_prefix(config.install_path_prefix())
                .filter(|rest| rest.is_empty() || rest.starts_with('/'))
                .unwrap_or(path)
        }
    };

    let slug = rest.trim_matches('/');
    if slug.is_empty() {
        None
    } else {
        Some(slug.to_string())
    }
}

/// Extract the language cookie value from a raw `Cookie` header.
pub fn cookie_language(cookie_header: &str) -> Option<&str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == LANGUAGE_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config(prefix: &str) -> LanguageConfig {
        LanguageConfig::from_codes("en", &["en", "it", "es"], prefix).unwrap()
    }

    // ==================== detect Tests ====================

    #[test]
    fn test_detect_path_prefix_with_install_path() {
        let detection = detect("/site/it/about-us/", None, &config("/site"));
        assert_eq!(detection.language.as_str(), "it");
        assert!(detection.sourced_from_path);
    }

    #[test]
    fn test_detect_path_beats_cookie() {
        let detection = detect("/es/contact/", Some("it"), &config(""));
        assert_eq!(detection.language.as_str(), "es");
        assert!(detection.sourced_from_path);
    }

    #[test]
    fn test_detect_bare_prefix_without_trailing_slash() {
        let detection = detect("/it", None, &config(""));
        assert_eq!(detection.language.as_str(), "it");
        assert!(detection.sourced_from_path);
    }

    #[test]
    fn test_detect_ignores_query_string() {
        let detection = detect("/it?preview=true", None, &config(""));
        assert_eq!(detection.language.as_str(), "it");
    }

    #[test]
    fn test_detect_prefix_must_be_whole_segment() {
        let detection = detect("/italy/", None, &config(""));
        assert_eq!(detection.language.as_str(), "en");
        assert!(!detection.sourced_from_path);
    }

    #[test]
    fn test_detect_prefix_must_follow_install_path() {
        // Language segment without the install path does not count
        let detection = detect("/it/about-us/", None, &config("/site"));
        assert_eq!(detection.language.as_str(), "en");

        let detection = detect("/siteit/", None, &config("/site"));
        assert!(!detection.sourced_from_path);
    }

    #[test]
    fn test_detect_disabled_language_prefix_is_ignored() {
        let detection = detect("/fr/about-us/", None, &config(""));
        assert_eq!(detection.language.as_str(), "en");
        assert!(!detection.sourced_from_path);
    }

    #[test]
    fn test_detect_cookie_used_without_prefix() {
        let detection = detect("/about-us/", Some("es"), &config(""));
        assert_eq!(detection.language.as_str(), "es");
        assert!(!detection.sourced_from_path);
        assert!(detection.cookie.is_none());
    }

    #[test]
    fn test_detect_unknown_cookie_falls_back_to_default() {
        let detection = detect("/about-us/", Some("fr"), &config(""));
        assert_eq!(detection.language.as_str(), "en");
    }

    #[test]
    fn test_detect_default_when_nothing_matches() {
        let detection = detect("/", None, &config(""));
        assert_eq!(detection.language.as_str(), "en");
        assert!(!detection.sourced_from_path);
    }

    #[test]
    fn test_detect_issues_cookie_when_from_path() {
        let detection = detect("/it/", None, &config(""));
        let cookie = detection.cookie.expect("cookie instruction");
        assert_eq!(cookie.name, LANGUAGE_COOKIE);
        assert_eq!(cookie.value.as_str(), "it");
        assert_eq!(cookie.max_age.num_days(), 30);
    }

    // ==================== PrefixMatcher Tests ====================

    #[test]
    fn test_empty_matcher_never_matches() {
        let matcher = PrefixMatcher::new("", &[]);
        assert_eq!(matcher.split("/it/"), None);
        assert_eq!(matcher.split("/"), None);
    }

    #[test]
    fn test_matcher_prefers_whole_code_with_region() {
        let codes = vec![
            LanguageCode::parse("pt").unwrap(),
            LanguageCode::parse("pt-br").unwrap(),
        ];
        let matcher = PrefixMatcher::new("", &codes);
        assert_eq!(matcher.split("/pt-br/inicio/"), Some(("pt-br", "inicio/")));
        assert_eq!(matcher.split("/pt/inicio/"), Some(("pt", "inicio/")));
    }

    #[test]
    fn test_matcher_remainder() {
        let config = config("/site");
        assert_eq!(
            config.matcher().split("/site/it/parent/child/"),
            Some(("it", "parent/child/"))
        );
        assert_eq!(config.matcher().split("/site/it"), Some(("it", "")));
    }

    // ==================== Helper Tests ====================

    #[test]
    fn test_has_language_prefix() {
        let config = config("/site");
        assert!(has_language_prefix("/site/es/", &config));
        assert!(!has_language_prefix("/site/about-us/", &config));
    }

    #[test]
    fn test_requested_slug() {
        let config = config("/site");
        assert_eq!(requested_slug("/site/it/about-us/", &config).as_deref(), Some("about-us"));
        assert_eq!(requested_slug("/site/about-us", &config).as_deref(), Some("about-us"));
        assert_eq!(
            requested_slug("/site/it/parent/child/?x=1", &config).as_deref(),
            Some("parent/child")
        );
        assert_eq!(requested_slug("/site/it/", &config), None);
        assert_eq!(requested_slug("/site/", &config), None);
        assert_eq!(requested_slug("/site", &config), None);
    }

    #[test]
    fn test_cookie_language_parsing() {
        assert_eq!(cookie_language("site_language=it"), Some("it"));
        assert_eq!(cookie_language("a=1; site_language=es ; b=2"), Some("es"));
        assert_eq!(cookie_language("lang=it"), None);
        assert_eq!(cookie_language("site_language="), None);
        assert_eq!(cookie_language(""), None);
    }

    #[test]
    fn test_cookie_header_value() {
        let detection = detect("/it/", None, &config(""));
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let header = detection.cookie.unwrap().header_value_at(now);
        assert_eq!(
            header,
            "site_language=it; Max-Age=2592000; Expires=Wed, 31 Jan 2024 12:00:00 GMT; Path=/; SameSite=Lax"
        );
    }
}
