//! Pipeline error types with HTTP status code mapping.
//!
//! [`PipelineError`] is the central error type for the gateway. Ingestion-side
//! failures map to a specific HTTP status and structured JSON error response;
//! dispatch-side failures never reach the uploading client and are only
//! logged by the consuming dispatcher.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 3001,
///     "message": "storage error at /var/cortex/data/7: permission denied",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`PipelineError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Central error enum for the ingestion-and-dispatch pipeline.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request            |
/// | 2000–2999 | Not Found       | 404 Not Found              |
/// | 3000–3999 | Server          | 500 Internal Server Error  |
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Request body failed validation before ingestion.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A decoded message is missing or mangling a field a registered topic
    /// requires.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// Dispatch or manual lookup for a topic that was never registered.
    #[error("unknown topic: {0}")]
    UnknownTopic(String),

    /// A named blob is absent from its scope directory.
    #[error("blob not found: {0}")]
    BlobNotFound(String),

    /// Scope creation, write, read, or delete failed at the filesystem level.
    #[error("storage error at {path}: {source}")]
    Storage {
        /// Path the failing operation targeted.
        path: String,
        /// Underlying filesystem error.
        source: std::io::Error,
    },

    /// A [`Context`](crate::storage::Context) was constructed from an empty
    /// or invalid scope path.
    #[error("invalid blob scope: {0}")]
    Scope(String),

    /// Error propagated from the image rendering layer.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::MalformedSnapshot(_) => 1002,
            Self::UnknownTopic(_) => 2001,
            Self::BlobNotFound(_) => 2002,
            Self::Internal(_) => 3000,
            Self::Storage { .. } => 3001,
            Self::Scope(_) => 3002,
            Self::Image(_) => 3003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::MalformedSnapshot(_) => StatusCode::BAD_REQUEST,
            Self::UnknownTopic(_) | Self::BlobNotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage { .. } | Self::Scope(_) | Self::Image(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Wraps a filesystem error with the path the operation targeted.
    pub(crate) fn storage(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.display().to_string(),
            source,
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
