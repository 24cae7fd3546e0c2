//! System endpoints: health check and topic catalog.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::broker::result_stream_name;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    dispatchers: usize,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, current timestamp, and the number of live dispatcher subscriptions.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            dispatchers: state.broker.snapshot_receiver_count(),
        }),
    )
}

/// One registered topic and its result stream.
#[derive(Debug, Serialize, ToSchema)]
struct TopicInfo {
    topic: String,
    result_stream: String,
}

/// `GET /config/topics` — List registered topics.
#[utoipa::path(
    get,
    path = "/config/topics",
    tag = "System",
    summary = "List registered topics",
    description = "Returns every topic the parser registry currently knows, with the result stream each one publishes to.",
    responses(
        (status = 200, description = "Topic catalog", body = Vec<TopicInfo>),
    )
)]
pub async fn topics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let topics: Vec<TopicInfo> = state
        .registry
        .topics()
        .await
        .into_iter()
        .map(|topic| TopicInfo {
            result_stream: result_stream_name(&topic),
            topic,
        })
        .collect();
    Json(topics)
}

/// Composes the system routes (mounted at the root, not under `/api/v1`).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/topics", get(topics_handler))
}
