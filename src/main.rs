//! Cardsales-RS: card sales search service
//!
//! This is the main entry point for the application.

use anyhow::Result;
use cardsales_rs::{
    config,
    metrics::Metrics,
    network::HttpClient,
    search::{Backends, Orchestrator},
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().skip(1).any(|a| a == "-h" || a == "--help") {
        print_usage();
        return Ok(());
    }

    let source = config::locate();
    let settings = config::load_from(source.as_deref())?;

    let default_level = if settings.general.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting Cardsales-RS v{}", cardsales_rs::VERSION);
    match source {
        Some(ref path) => info!("Loaded settings from: {}", path.display()),
        None => info!("No settings file found, using defaults"),
    }
    settings.validate()?;
    info!("Loaded configuration for instance: {}", settings.general.instance_name);

    let client = HttpClient::with_settings(&settings.outgoing)?;
    info!("HTTP client initialized");

    let metrics = Arc::new(Metrics::new());
    let backends = Backends::from_settings(client, &settings);
    let handle = Orchestrator::from_settings(backends, &settings, metrics.clone());
    info!(
        "Search orchestrator started (store: {}, scrape: {})",
        settings.store.url, settings.scrape.base_url
    );

    let addr = SocketAddr::new(
        settings.server.bind_address.parse()?,
        settings.server.port,
    );

    let state = AppState::new(settings, handle, metrics)?;
    let app = create_router(state);

    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_usage() {
    println!(
        r#"
Cardsales-RS v{}
Card sales search for collectible trading cards

USAGE:
    cardsales-rs [OPTIONS]

OPTIONS:
    -h, --help             Print help information

ENVIRONMENT VARIABLES:
    CARDSALES_SETTINGS_PATH  Path to settings.yml
    CARDSALES_DEBUG          Enable debug logging (true/false)
    CARDSALES_PORT           Server port
    CARDSALES_BIND_ADDRESS   Bind address
    CARDSALES_STORE_URL      Base URL of the PostgREST store
    CARDSALES_STORE_KEY      API key for the store
    CARDSALES_SCRAPE_URL     Base URL of the scrape service
    RUST_LOG                 Log filter (overrides CARDSALES_DEBUG)
"#,
        cardsales_rs::VERSION
    );
}
