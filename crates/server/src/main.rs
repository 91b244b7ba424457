use std::sync::Arc;

use anyhow::{Context, Result};
use server::{app_router, state::AppState};
use strata_core::{
    cache::{CachedFetcher, CacheStore},
    config::AppConfig,
    upstream::ApiClient,
};
use tokio::{net::TcpListener, signal, sync::broadcast};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the logging system based on the configuration.
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,strata_core={level},server={level}",
            level = config.logging.level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().pretty().with_target(false))
            .init();
    }
}

async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    // Failure to listen for ctrl-c leaves only external kill; surface it.
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
    let _ = shutdown_tx.send(());
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Arc::new(AppConfig::load().context("failed to load configuration")?);
    init_logging(&config);

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    // One store/fetcher/client per process, created at startup, flushed only
    // on explicit request, torn down at process exit.
    let store = Arc::new(CacheStore::new());
    let sweeper = store.spawn_sweeper(
        std::time::Duration::from_secs(config.cache.sweep_interval_seconds),
        shutdown_tx.subscribe(),
    );
    let fetcher = Arc::new(CachedFetcher::new(Arc::clone(&store)));
    let client = Arc::new(
        ApiClient::new(config.api_client_config()).context("failed to build upstream client")?,
    );

    let state = AppState::new(Arc::clone(&config), fetcher, client);
    let app = app_router(state);

    let addr = config.socket_addr().map_err(anyhow::Error::msg)?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        addr = %addr,
        upstream = %config.upstream.base_url,
        default_ttl_seconds = config.cache.default_ttl_seconds,
        "strata server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx.clone()))
        .await
        .context("server error")?;

    // Stop the sweeper before exit so the task doesn't outlive the server.
    let _ = shutdown_tx.send(());
    let _ = sweeper.await;
    info!("shutdown complete");
    Ok(())
}
