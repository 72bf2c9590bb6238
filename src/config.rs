use crate::i18n::{LanguageCode, LanguageConfig};
use crate::switcher::{FlagStyle, MenuLocation, MenuSettings};
use anyhow::{Context, Result};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    // Languages
    pub languages: LanguageConfig,

    // Storage
    pub content_file: String,
    pub links_file: String,

    // Switcher
    pub menu: MenuSettings,
    pub redirect_to_preferred: bool,

    // Server
    pub port: u16,
    pub admin_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let default_language = std::env::var("DEFAULT_LANGUAGE").unwrap_or_else(|_| "en".to_string());
        let enabled_languages =
            std::env::var("ENABLED_LANGUAGES").unwrap_or_else(|_| "en,it,es".to_string());
        let install_path = std::env::var("INSTALL_PATH").unwrap_or_default();

        Ok(Self {
            languages: build_language_config(&default_language, &enabled_languages, &install_path)?,

            // Storage
            content_file: std::env::var("CONTENT_FILE")
                .unwrap_or_else(|_| "content.json".to_string()),
            links_file: std::env::var("LINKS_FILE")
                .unwrap_or_else(|_| "translation_links.json".to_string()),

            // Switcher
            menu: MenuSettings {
                add_to_menu: env_flag("MENU_ADD"),
                location: MenuLocation::parse(
                    &std::env::var("MENU_LOCATION").unwrap_or_else(|_| "all".to_string()),
                ),
                style: std::env::var("MENU_FLAG_TYPE")
                    .ok()
                    .map(|raw| raw.parse::<FlagStyle>())
                    .transpose()
                    .map_err(anyhow::Error::msg)
                    .context("MENU_FLAG_TYPE is invalid")?
                    .unwrap_or_default(),
            },
            redirect_to_preferred: env_flag("REDIRECT_TO_PREFERRED"),

            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            admin_api_key: std::env::var("ADMIN_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
        })
    }
}

/// Build the language config from raw settings.
///
/// A default language missing from the enabled list is a configuration
/// mistake, but not a fatal one: it is logged and the default is enabled
/// first so every fallback still lands on a served language.
pub fn build_language_config(
    default_language: &str,
    enabled_languages: &str,
    install_path: &str,
) -> Result<LanguageConfig> {
    let default_language = LanguageCode::parse(default_language)
        .with_context(|| format!("DEFAULT_LANGUAGE '{}' is invalid", default_language))?;

    let mut enabled = enabled_languages
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| {
            LanguageCode::parse(code)
                .with_context(|| format!("ENABLED_LANGUAGES contains invalid code '{}'", code))
        })
        .collect::<Result<Vec<_>>>()?;

    if !enabled.contains(&default_language) {
        warn!(
            "Default language '{}' is not enabled; enabling it",
            default_language
        );
        enabled.insert(0, default_language.clone());
    }

    LanguageConfig::new(default_language, enabled, install_path)
        .context("Invalid language configuration")
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
