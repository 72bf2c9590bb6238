//! Language-prefixed routing and translation links for content sites.
//!
//! Requests like `/site/it/about-us/` are resolved to the Italian page linked
//! to the default-language `about-us` page, with graceful fallbacks whenever a
//! translation does not exist.

pub mod config;
pub mod content;
pub mod i18n;
pub mod links;
pub mod redirect;
pub mod report;
pub mod resolver;
pub mod router;
pub mod security;
pub mod store;
pub mod switcher;
pub mod web;
