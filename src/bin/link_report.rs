//! Link report binary - prints the translation link table with page status
//!
//! Usage:
//!   cargo run --bin link-report            # Human-readable report
//!   cargo run --bin link-report -- --json  # JSON report
//!
//! Optional environment variables:
//! - DEFAULT_LANGUAGE (defaults to en)
//! - ENABLED_LANGUAGES (defaults to en,it,es)
//! - CONTENT_FILE (defaults to content.json)
//! - LINKS_FILE (defaults to translation_links.json)

use anyhow::{Context, Result};
use langroute::config::Config;
use langroute::content::MemoryContentStore;
use langroute::report::LinkReport;
use langroute::store::{JsonFileLinkStore, LinkTableStore};
use tracing::{info, warn};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("langroute=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let as_json = std::env::args().any(|arg| arg == "--json");

    let config = Config::from_env()?;
    let content = MemoryContentStore::load(&config.content_file)?;
    let links = JsonFileLinkStore::new(&config.links_file)
        .load()
        .context("Failed to load translation links")?;

    let report = LinkReport::build(&links, &content, &config.languages);
    info!("Built report for {} link entries", report.rows.len());

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }

    let dangling = report.dangling_count();
    if dangling > 0 {
        warn!("{} stored links point at missing pages", dangling);
    }

    Ok(())
}
