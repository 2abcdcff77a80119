mod models;
mod handlers;
mod services;
mod middleware;
mod config;
mod errors;
mod state;
mod router;

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use crate::{
    config::{Config, StorageBackend},
    services::{MemoryStore, RedisService, SharedStore},
    state::AppState,
};

fn init_tracing(level: &str) {
    // RUST_LOG wins over the configured level
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

fn build_store(config: &Config) -> anyhow::Result<SharedStore> {
    let store: SharedStore = match config.storage.backend {
        StorageBackend::Redis => {
            let url = if config.redis.sentinel_enabled {
                config.redis.sentinel_url.clone()
                    .context("Sentinel URL not configured")?
            } else {
                config.redis.url.clone()
            };
            let client = redis::Client::open(url)
                .context("Failed to connect to Redis")?;
            Arc::new(RedisService::new(Arc::new(client)))
        }
        StorageBackend::Memory => match config.storage.memory_quota_bytes {
            Some(quota) => Arc::new(MemoryStore::with_quota(quota)),
            None => Arc::new(MemoryStore::new()),
        },
    };
    Ok(store)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    init_tracing(&config.logging.level);

    let store = build_store(&config)?;
    let analyzer = services::build_analyzer(&config.analysis)
        .context("Failed to set up analysis backend")?;

    tracing::info!(
        "Using {} storage and {} analyzer",
        store.backend_tag(),
        analyzer.backend_tag()
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = router::build_router(AppState::new(config, store, analyzer));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind server to {}", addr))?;

    tracing::info!("Server running on {}", addr);
    axum::serve(listener, app.into_make_service())
        .await
        .context("Failed to start server")?;

    Ok(())
}
