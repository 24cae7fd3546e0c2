//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::{MessageBroker, ParserRegistry};
use crate::service::IngestService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Ingestion service handling snapshot uploads.
    pub ingest: Arc<IngestService>,
    /// Parser registry, exposed for the topic catalog endpoint.
    pub registry: Arc<ParserRegistry>,
    /// Message streams shared with the dispatchers.
    pub broker: MessageBroker,
}
