//! Snapshot ingestion DTOs.
//!
//! The upload request body is the client-form wire shape itself
//! ([`crate::wire::ClientSnapshot`]); the response is a bare
//! acknowledgement, since the ingestion boundary is fire-and-forget
//! beyond it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::SnapshotId;

/// Response body for `POST /snapshots` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct SnapshotAccepted {
    /// Server-assigned snapshot id.
    pub uuid: SnapshotId,
    /// Server receive timestamp.
    pub received_at: DateTime<Utc>,
}
