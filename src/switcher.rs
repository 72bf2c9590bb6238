//! Language switcher markup: flags, the nav-menu item, and the admin bar label.

use crate::content::{ContentItem, ContentStore};
use crate::i18n::{LanguageCode, LanguageRegistry};
use crate::router::TranslationRouter;
use std::str::FromStr;

/// How a language is labelled in the switcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagStyle {
    /// Flag emoji (🇮🇹)
    #[default]
    Emoji,
    /// Upper-cased code (IT)
    Text,
}

impl FromStr for FlagStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "emoji" => Ok(FlagStyle::Emoji),
            "text" => Ok(FlagStyle::Text),
            other => Err(format!("Unknown flag type: '{}'. Expected 'emoji' or 'text'", other)),
        }
    }
}

/// Which navigation menus receive the switcher.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MenuLocation {
    #[default]
    All,
    Named(String),
}

impl MenuLocation {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "all" => MenuLocation::All,
            name => MenuLocation::Named(name.to_string()),
        }
    }

    pub fn matches(&self, location: &str) -> bool {
        match self {
            MenuLocation::All => true,
            MenuLocation::Named(name) => name == location,
        }
    }
}

/// Nav-menu integration settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuSettings {
    pub add_to_menu: bool,
    pub location: MenuLocation,
    pub style: FlagStyle,
}

/// Label for a language: its flag emoji, or its upper-cased code.
///
/// Languages missing from the registry always use the text label.
pub fn flag_label(code: &LanguageCode, style: FlagStyle) -> String {
    match style {
        FlagStyle::Emoji => LanguageRegistry::get()
            .get_by_code(code.as_str())
            .map(|info| info.flag.to_string())
            .unwrap_or_else(|| code.label()),
        FlagStyle::Text => code.label(),
    }
}

/// Render one flag. The current language is a non-clickable span.
pub fn render_flag(code: &LanguageCode, url: &str, is_current: bool, style: FlagStyle) -> String {
    let label = flag_label(code, style);
    let class = format!("lang-flag-{}", code);

    if is_current {
        format!(
            r#"<span class="{} current-lang">{}</span>"#,
            escape_html(&class),
            label
        )
    } else {
        format!(
            r#"<a href="{}" class="{}">{}</a>"#,
            escape_html(url),
            escape_html(&class),
            label
        )
    }
}

/// Render a flag for every enabled language.
///
/// With no current item (archive or 404 pages) each flag links to its
/// language homepage.
pub fn render_switcher<C: ContentStore>(
    router: &TranslationRouter<'_, C>,
    current_item: Option<&ContentItem>,
    current_language: &LanguageCode,
    style: FlagStyle,
) -> String {
    router
        .config()
        .enabled_languages()
        .iter()
        .map(|language| {
            let url = match current_item {
                Some(item) => router.url_for(item, language),
                None => router.home_url(language),
            };
            render_flag(language, &url, language == current_language, style)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Wrap switcher markup in a nav-menu list item.
pub fn menu_item(switcher_html: &str) -> String {
    format!(
        r#"<li class="menu-item menu-item-language-switcher">{}</li>"#,
        switcher_html
    )
}

/// Append the switcher item to a rendered menu at `location`.
///
/// The item goes right before the last `</ul>`; menus without one get it
/// appended. Menus are returned unchanged when integration is off or the
/// location does not match.
pub fn inject_into_menu(
    menu_html: &str,
    location: &str,
    settings: &MenuSettings,
    switcher_html: &str,
) -> String {
    if !settings.add_to_menu || !settings.location.matches(location) {
        return menu_html.to_string();
    }

    let item = menu_item(switcher_html);
    match menu_html.rfind("</ul>") {
        Some(pos) => {
            let mut html = String::with_capacity(menu_html.len() + item.len());
            html.push_str(&menu_html[..pos]);
            html.push_str(&item);
            html.push_str(&menu_html[pos..]);
            html
        }
        None => format!("{}{}", menu_html, item),
    }
}

/// Admin bar indicator, e.g. `🌐 Italian (IT)`.
pub fn admin_bar_label(code: &LanguageCode) -> String {
    let name = LanguageRegistry::get().name_or_code(code.as_str());
    format!("🌐 {} ({})", name, code.label())
}

/// Escape text for use in HTML attributes and text nodes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
