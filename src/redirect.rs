//! Redirect decisions for language URLs.
//!
//! Two kinds of redirect exist: a permanent one that puts a language URL in
//! its canonical trailing-slash form, and an optional temporary one that
//! sends a visitor with a remembered language to that language's version of
//! an unprefixed page.

use crate::content::{ContentItem, ContentStore};
use crate::resolver::{split_language_prefix, Detection};
use crate::router::TranslationRouter;

/// HTTP status class of a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// 301: canonicalization
    Permanent,
    /// 302: personalization
    Temporary,
}

impl RedirectKind {
    pub fn status_code(self) -> u16 {
        match self {
            RedirectKind::Permanent => 301,
            RedirectKind::Temporary => 302,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
    pub kind: RedirectKind,
}

/// Permanent redirect for a language URL missing its trailing slash.
///
/// `/site/it/about-us` → `/site/it/about-us/`; the query string is kept.
pub fn canonical_redirect<C: ContentStore>(
    request_path: &str,
    query: Option<&str>,
    router: &TranslationRouter<'_, C>,
) -> Option<Redirect> {
    split_language_prefix(request_path, router.config())?;
    if request_path.ends_with('/') {
        return None;
    }

    let mut location = format!("{}/", request_path);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        location.push('?');
        location.push_str(query);
    }

    Some(Redirect {
        location,
        kind: RedirectKind::Permanent,
    })
}

/// Temporary redirect to the visitor's remembered language.
///
/// Applies only to unprefixed requests whose language came from the cookie
/// and differs from the default. The requested page is kept: without a
/// translation the visitor lands on the canonical page under the language
/// prefix. Returns `None` when the target URL equals the requested path, so a
/// redirect can never loop.
pub fn preferred_language_redirect<C: ContentStore>(
    request_path: &str,
    detection: &Detection,
    served: Option<&ContentItem>,
    router: &TranslationRouter<'_, C>,
) -> Option<Redirect> {
    if detection.sourced_from_path || router.config().is_default(&detection.language) {
        return None;
    }

    let location = match served {
        Some(item) => router.serving_url(item, &detection.language),
        None => router.home_url(&detection.language),
    };
    if location == request_path {
        return None;
    }

    Some(Redirect {
        location,
        kind: RedirectKind::Temporary,
    })
}
