//! cortex-gateway server entry point.
//!
//! Starts the dispatchers and the Axum HTTP ingestion endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use cortex_gateway::api;
use cortex_gateway::app_state::AppState;
use cortex_gateway::config::PipelineConfig;
use cortex_gateway::dispatch;
use cortex_gateway::dispatch::parsers::builtin_parsers;
use cortex_gateway::domain::{MessageBroker, ParserRegistry};
use cortex_gateway::service::IngestService;
use cortex_gateway::storage::BlobStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = PipelineConfig::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;
    tracing::info!(addr = %config.listen_addr, "starting cortex-gateway");

    // Blob store
    let blobs = BlobStore::new(&config.data_root);
    tokio::fs::create_dir_all(blobs.root()).await?;
    tracing::info!(root = %blobs.root().display(), "blob store ready");

    // Parser registry with the builtin units
    let registry = Arc::new(ParserRegistry::new());
    for parser in builtin_parsers() {
        registry.register(parser).await;
    }

    // Message streams and one dispatcher per registered topic
    let broker = MessageBroker::new(
        config.snapshot_stream_capacity,
        config.result_stream_capacity,
    );
    let dispatchers = dispatch::spawn_for_registered_topics(&registry, &broker).await;
    tracing::info!(count = dispatchers.len(), "dispatchers running");

    // Ingestion service and application state
    let ingest = Arc::new(IngestService::new(blobs, broker.clone()));
    let app_state = AppState {
        ingest,
        registry,
        broker,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
