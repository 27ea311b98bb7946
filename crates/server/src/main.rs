use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dexcache_core::{
    load_config, load_config_or_default, open_store, validate_config, CatalogService,
    CatalogSource, Config, PokeApiClient, ServiceOptions,
};
use dexcache_server::{create_router, AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = match read_config() {
        Ok(config) => config,
        Err(e) => {
            init_logging(false);
            return Err(e);
        }
    };

    init_logging(config.logging.json);
    info!("Starting dexcache v{}", VERSION);

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Upstream: {}", config.source.base_url);
    info!("Cache: {}", config.cache.url);
    info!("Search policy: {}", config.catalog.search_policy.as_str());

    // Open the cache store
    let backend = config.cache.backend().context("Invalid cache URL")?;
    let store = open_store(&backend).context("Failed to open catalog cache")?;
    info!("Catalog cache opened");

    // Create upstream client
    let source: Arc<dyn CatalogSource> =
        Arc::new(PokeApiClient::new(&config.source).context("Failed to create upstream client")?);

    let catalog = Arc::new(CatalogService::new(
        store,
        source,
        ServiceOptions::from(&config),
    ));

    // Populate the cache before accepting requests
    if let Err(e) = catalog.initialize().await {
        if config.catalog.exit_on_populate_failure {
            return Err(e).context("Initial catalog population failed");
        }
        warn!("Initial catalog population failed, serving in degraded mode: {}", e);
    }

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), catalog));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Load configuration from `DEXCACHE_CONFIG`, or `config.toml` when present.
fn read_config() -> Result<Config> {
    match std::env::var("DEXCACHE_CONFIG") {
        Ok(path) => {
            let path = PathBuf::from(path);
            load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
        }
        Err(_) => {
            let path = PathBuf::from("config.toml");
            load_config_or_default(&path)
                .with_context(|| format!("Failed to load config from {:?}", path))
        }
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
