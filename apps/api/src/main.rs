mod config;
mod errors;
mod extraction;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::cache::{InMemoryQuestionCache, QuestionCache, RedisQuestionCache};
use crate::extraction::merge::load_curated;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Prepdesk API v{}", env!("CARGO_PKG_VERSION"));

    let cache = build_cache(&config)?;
    info!(
        "Extraction cache initialized (backend: {}, ttl: {}s)",
        cache.backend(),
        config.cache_ttl_secs
    );

    let curated = match &config.curated_questions_path {
        Some(path) => load_curated(Path::new(path))?,
        None => Vec::new(),
    };
    info!("Loaded {} curated questions", curated.len());

    info!(
        "Extraction options: default_frequency={} join_continuation_lines={} frequency_blend={:?}",
        config.default_frequency, config.join_continuation_lines, config.frequency_blend
    );

    let state = AppState {
        config: config.clone(),
        cache,
        curated: Arc::new(curated),
        http: reqwest::Client::new(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Redis when `REDIS_URL` is configured, otherwise an in-process cache.
fn build_cache(config: &Config) -> Result<Arc<dyn QuestionCache>> {
    Ok(match &config.redis_url {
        Some(url) => Arc::new(RedisQuestionCache::new(
            redis::Client::open(url.as_str())?,
            config.cache_ttl_secs,
        )),
        None => Arc::new(InMemoryQuestionCache::new(config.cache_ttl_secs)),
    })
}
