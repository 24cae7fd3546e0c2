//! # cortex-gateway
//!
//! Snapshot ingestion and dispatch gateway for the cortex cognition
//! pipeline.
//!
//! This crate accepts time-series sensor/cognition snapshots over HTTP,
//! assigns each a unique id, offloads binary payloads to on-disk blob
//! storage, and fans the reshaped message out to independent per-topic
//! parsers. Each parser's result is published to its own result stream for
//! an external saver; persistence and querying are collaborators, not
//! part of this service.
//!
//! ## Architecture
//!
//! ```text
//! Client (HTTP)
//!     │
//!     ├── REST Handler (api/)
//!     ├── IngestService (service/)
//!     │       ├── SnapshotIdGenerator (domain/)
//!     │       ├── Wire Codec (wire/)
//!     │       └── BlobStore (storage/)
//!     │
//!     ├── MessageBroker snapshot stream (domain/)
//!     │
//!     ├── Dispatcher per topic (dispatch/)
//!     │       ├── ParserRegistry (domain/)
//!     │       └── Context (storage/)
//!     │
//!     └── MessageBroker results.<topic> streams → external saver
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod service;
pub mod storage;
pub mod wire;
