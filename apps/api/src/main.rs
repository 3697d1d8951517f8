mod analysis;
mod config;
mod criteria;
mod errors;
mod llm_client;
mod models;
mod routes;
mod scouting;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Scout API v{}", env!("CARGO_PKG_VERSION"));

    // The LLM client is optional: without a key the pipeline skips analysis
    let llm = match &config.anthropic_api_key {
        Some(key) => {
            let client = LlmClient::new(
                key.clone(),
                config.anthropic_api_url.clone(),
                config.llm_timeout,
                config.llm_max_attempts,
            )?;
            info!(
                "LLM client initialized (model: {}, timeout: {:?}, attempts: {})",
                llm_client::MODEL,
                config.llm_timeout,
                config.llm_max_attempts
            );
            Some(client)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; jobs will complete without analysis");
            None
        }
    };

    info!(
        "Scout config: batch={} pacing={:?}..{:?} enrichment={:?} on_failure={:?}",
        config.scout.batch_size,
        config.scout.pacing_min,
        config.scout.pacing_max,
        config.scout.enrichment_latency,
        config.scout.failure_policy
    );

    let state = AppState::new(&config, llm);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
