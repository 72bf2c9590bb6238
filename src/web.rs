//! HTTP host: serves language-prefixed pages and the link-table admin API.
//!
//! Every GET that is not an admin route goes through [`serve_page`], which
//! plays the host's part of the request cycle: read path and cookie, detect
//! the language, redirect or resolve content, render, and set the language
//! cookie.

use crate::config::Config;
use crate::content::{assign_language, ContentId, ContentItem, ContentStore, LanguageAssignment, MemoryContentStore};
use crate::i18n::LanguageCode;
use crate::links::{LinkSubmission, TranslationLinks};
use crate::redirect::{canonical_redirect, preferred_language_redirect, Redirect, RedirectKind};
use crate::report::LinkReport;
use crate::resolver::{cookie_language, detect, requested_slug, Detection};
use crate::router::TranslationRouter;
use crate::security::admin_authorized;
use crate::store::{LinkTableStore, StoreError};
use crate::switcher::{admin_bar_label, escape_html, inject_into_menu, render_switcher};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Header carrying the admin API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Menu location the demo theme renders.
const PRIMARY_MENU: &str = "primary";

/// Shared state for all handlers.
pub struct AppState {
    pub config: Config,
    pub content: MemoryContentStore,
    pub links: Arc<dyn LinkTableStore>,
}

/// Build the axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/admin/links", get(get_links).post(save_links))
        .route("/admin/items/:id/language", post(set_item_language))
        .route("/admin/report", get(get_report))
        .fallback(serve_page)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ==================== Page Serving ====================

async fn serve_page(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let path = uri.path();
    let languages = &state.config.languages;
    let links = load_links_or_empty(state.links.as_ref());
    let router = TranslationRouter::new(languages, &links, &state.content);

    if let Some(redirect) = canonical_redirect(path, uri.query(), &router) {
        return redirect_response(&redirect);
    }

    let cookie = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(cookie_language);
    let detection = detect(path, cookie, languages);
    let slug = requested_slug(path, languages);

    let served = router
        .resolve_for_serving(&detection.language, slug.as_deref())
        .and_then(|id| state.content.get(id));

    let admin = is_admin_request(&state, &headers);

    let Some(item) = served else {
        info!("No content for {} ({})", path, detection.language);
        let html = render_document(&router, None, &detection.language, &state.config, "Page not found", admin);
        return with_language_cookie((StatusCode::NOT_FOUND, Html(html)).into_response(), &detection);
    };

    if state.config.redirect_to_preferred {
        if let Some(redirect) = preferred_language_redirect(path, &detection, Some(&item), &router) {
            return redirect_response(&redirect);
        }
    }

    let title = if item.title.is_empty() { item.slug.clone() } else { item.title.clone() };
    let html = render_document(&router, Some(&item), &detection.language, &state.config, &title, admin);
    with_language_cookie(Html(html).into_response(), &detection)
}

fn load_links_or_empty(store: &dyn LinkTableStore) -> TranslationLinks {
    match store.load() {
        Ok(links) => links,
        Err(e) => {
            warn!("Failed to load translation links, serving without them: {}", e);
            TranslationLinks::new()
        }
    }
}

fn redirect_response(redirect: &Redirect) -> Response {
    let status = match redirect.kind {
        RedirectKind::Permanent => StatusCode::MOVED_PERMANENTLY,
        RedirectKind::Temporary => StatusCode::FOUND,
    };
    (status, [(header::LOCATION, redirect.location.clone())]).into_response()
}

fn with_language_cookie(mut response: Response, detection: &Detection) -> Response {
    if let Some(cookie) = &detection.cookie {
        match HeaderValue::from_str(&cookie.header_value()) {
            Ok(value) => {
                response.headers_mut().insert(header::SET_COOKIE, value);
            }
            Err(e) => warn!("Could not encode language cookie: {}", e),
        }
    }
    response
}

fn render_document(
    router: &TranslationRouter<'_, MemoryContentStore>,
    item: Option<&ContentItem>,
    language: &LanguageCode,
    config: &Config,
    title: &str,
    admin: bool,
) -> String {
    let switcher = render_switcher(router, item, language, config.menu.style);
    let menu = format!(
        r#"<ul class="menu"><li class="menu-item"><a href="{}">Home</a></li></ul>"#,
        escape_html(&router.home_url(language))
    );
    let menu = inject_into_menu(&menu, PRIMARY_MENU, &config.menu, &switcher);
    let admin_bar = if admin {
        format!(
            "<div id=\"admin-bar\">{}</div>\n",
            escape_html(&admin_bar_label(language))
        )
    } else {
        String::new()
    };

    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"{lang}\">\n",
            "<head><meta charset=\"utf-8\"><title>{title}</title></head>\n",
            "<body>\n",
            "{admin_bar}",
            "<header><div class=\"language-switcher\">{switcher}</div><nav>{menu}</nav></header>\n",
            "<main><h1>{title}</h1></main>\n",
            "</body>\n",
            "</html>\n"
        ),
        lang = language,
        title = escape_html(title),
        admin_bar = admin_bar,
        switcher = switcher,
        menu = menu,
    )
}

// ==================== Admin API ====================

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("missing or invalid API key")]
    Unauthorized,

    #[error("item {0} not found")]
    MissingItem(ContentId),

    #[error("language '{0}' is not enabled")]
    RejectedLanguage(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to save content: {0:#}")]
    ContentSave(anyhow::Error),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdminError::Unauthorized => StatusCode::UNAUTHORIZED,
            AdminError::MissingItem(_) => StatusCode::NOT_FOUND,
            AdminError::RejectedLanguage(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AdminError::Store(e) => {
                error!("Link table store failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AdminError::ContentSave(e) => {
                error!("Content store save failed: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

fn provided_api_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
}

/// Page requests only show the admin bar to holders of a configured key.
fn is_admin_request(state: &AppState, headers: &HeaderMap) -> bool {
    match (state.config.admin_api_key.as_deref(), provided_api_key(headers)) {
        (Some(expected), Some(given)) => admin_authorized(Some(expected), Some(given)),
        _ => false,
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), AdminError> {
    if admin_authorized(state.config.admin_api_key.as_deref(), provided_api_key(headers)) {
        Ok(())
    } else {
        warn!("Rejected admin request with missing or invalid API key");
        Err(AdminError::Unauthorized)
    }
}

async fn get_links(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<TranslationLinks>, AdminError> {
    authorize(&state, &headers)?;
    Ok(Json(state.links.load()?))
}

async fn save_links(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(submission): Json<LinkSubmission>,
) -> Result<Json<TranslationLinks>, AdminError> {
    authorize(&state, &headers)?;

    let links = TranslationLinks::from_submission(&submission, &state.config.languages);
    state.links.replace(&links)?;
    info!(
        "Translation links saved: {} submitted, {} kept",
        submission.len(),
        links.len()
    );
    Ok(Json(links))
}

#[derive(Debug, Deserialize)]
pub struct LanguageForm {
    pub language: String,
}

async fn set_item_language(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Form(form): Form<LanguageForm>,
) -> Result<Json<serde_json::Value>, AdminError> {
    authorize(&state, &headers)?;

    let id = ContentId(id);
    match assign_language(&state.content, id, &form.language, &state.config.languages) {
        LanguageAssignment::Assigned(language) => {
            state.content.save().map_err(AdminError::ContentSave)?;
            Ok(Json(serde_json::json!({ "id": id, "language": language })))
        }
        LanguageAssignment::Rejected(code) => Err(AdminError::RejectedLanguage(code)),
        LanguageAssignment::MissingItem => Err(AdminError::MissingItem(id)),
    }
}

async fn get_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<LinkReport>, AdminError> {
    authorize(&state, &headers)?;

    let links = state.links.load()?;
    Ok(Json(LinkReport::build(&links, &state.content, &state.config.languages)))
}
