use anyhow::{Context, Result};
use langroute::config::Config;
use langroute::content::MemoryContentStore;
use langroute::store::{JsonFileLinkStore, LinkTableStore};
use langroute::web::{build_router, AppState};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("langroute=info".parse()?),
        )
        .init();

    info!("Starting language router");

    // Load configuration from environment
    let config = Config::from_env()?;
    info!(
        "Languages: default {}, enabled [{}], install path '{}'",
        config.languages.default_language(),
        config
            .languages
            .enabled_languages()
            .iter()
            .map(|code| code.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        config.languages.install_path_prefix()
    );
    if config.admin_api_key.is_none() {
        info!("ADMIN_API_KEY not set, admin routes are open");
    }

    let content = MemoryContentStore::load(&config.content_file)?;
    let links = JsonFileLinkStore::new(&config.links_file);
    let table = links.load().context("Failed to load translation links")?;
    info!("Loaded {} translation link entries", table.len());

    let port = config.port;
    let state = Arc::new(AppState {
        config,
        content,
        links: Arc::new(links),
    });
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
