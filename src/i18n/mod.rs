//! Language primitives shared by the resolver, the router and the switcher.
//!
//! # Architecture
//!
//! - `language`: validated `LanguageCode` type
//! - `config`: per-site `LanguageConfig` (default, enabled, install path)
//! - `registry`: display metadata (names, flags) for known languages
//!
//! # Example
//!
//! ```rust
//! use langroute::i18n::{LanguageConfig, LanguageRegistry};
//!
//! let config = LanguageConfig::from_codes("en", &["en", "it", "es"], "/site").unwrap();
//! assert!(config.is_enabled("it"));
//!
//! let italian = LanguageRegistry::get().get_by_code("it").unwrap();
//! assert_eq!(italian.name, "Italian");
//! ```

mod config;
mod language;
mod registry;

pub use config::{ConfigError, LanguageConfig};
pub use language::{LanguageCode, LanguageError};
pub use registry::{LanguageInfo, LanguageRegistry};
