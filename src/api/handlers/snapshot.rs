//! Snapshot ingestion handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::SnapshotAccepted;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, PipelineError};
use crate::wire::ClientSnapshot;

/// `POST /snapshots` — Ingest one client-form snapshot.
///
/// # Errors
///
/// Returns [`PipelineError::Storage`] if blob offloading fails; nothing is
/// published in that case.
#[utoipa::path(
    post,
    path = "/api/v1/snapshots",
    tag = "Snapshots",
    summary = "Ingest a snapshot",
    description = "Accepts one self-contained client-form snapshot, assigns it a unique id, offloads binary payloads to blob storage, and publishes the dispatch form to the snapshot stream.",
    request_body = ClientSnapshot,
    responses(
        (status = 201, description = "Snapshot accepted and published", body = SnapshotAccepted),
        (status = 400, description = "Malformed snapshot body", body = ErrorResponse),
        (status = 500, description = "Blob storage failure", body = ErrorResponse),
    )
)]
pub async fn upload_snapshot(
    State(state): State<AppState>,
    Json(snapshot): Json<ClientSnapshot>,
) -> Result<impl IntoResponse, PipelineError> {
    let uuid = state.ingest.handle_snapshot(snapshot).await?;
    Ok((
        StatusCode::CREATED,
        Json(SnapshotAccepted {
            uuid,
            received_at: Utc::now(),
        }),
    ))
}

/// Composes the snapshot routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/snapshots", post(upload_snapshot))
}
