//! In-process message streams for snapshots and parser results.
//!
//! [`MessageBroker`] wraps [`tokio::sync::broadcast`] channels: a single
//! snapshot stream consumed by every dispatcher (fan-out, not partitioning)
//! and one result stream per topic, created lazily and named
//! `results.<topic>`. It models the broker boundary the rest of the core
//! programs against; the transport to an external broker is a deployment
//! concern outside this crate.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::sync::broadcast;

/// Serialized message payload carried on a stream.
pub type StreamPayload = Vec<u8>;

/// Returns the deterministic result stream name for a topic.
#[must_use]
pub fn result_stream_name(topic: &str) -> String {
    format!("results.{topic}")
}

/// Broadcast streams connecting the ingestion server, the dispatchers, and
/// the external saver.
///
/// When a stream's ring buffer is full, the oldest messages are dropped for
/// lagging receivers; dispatchers log the lag and continue.
#[derive(Debug, Clone)]
pub struct MessageBroker {
    snapshots: broadcast::Sender<StreamPayload>,
    results: Arc<RwLock<HashMap<String, broadcast::Sender<StreamPayload>>>>,
    result_capacity: usize,
}

impl MessageBroker {
    /// Creates a broker with the given per-stream capacities.
    #[must_use]
    pub fn new(snapshot_capacity: usize, result_capacity: usize) -> Self {
        let (snapshots, _) = broadcast::channel(snapshot_capacity);
        Self {
            snapshots,
            results: Arc::new(RwLock::new(HashMap::new())),
            result_capacity,
        }
    }

    /// Publishes a serialized dispatch-form snapshot to the snapshot stream.
    ///
    /// Returns the number of receivers that received the message. If no
    /// dispatcher is subscribed, the message is silently dropped.
    pub fn publish_snapshot(&self, payload: StreamPayload) -> usize {
        self.snapshots.send(payload).unwrap_or(0)
    }

    /// Creates a new receiver on the snapshot stream.
    ///
    /// Every dispatcher calls this once before its consumption loop starts,
    /// so each sees every snapshot published afterwards.
    #[must_use]
    pub fn subscribe_snapshots(&self) -> broadcast::Receiver<StreamPayload> {
        self.snapshots.subscribe()
    }

    /// Returns the number of active snapshot stream receivers.
    #[must_use]
    pub fn snapshot_receiver_count(&self) -> usize {
        self.snapshots.receiver_count()
    }

    /// Publishes a serialized parser result to the topic's result stream.
    ///
    /// The stream is created on first use. Returns the number of receivers
    /// that received the message.
    pub async fn publish_result(&self, topic: &str, payload: StreamPayload) -> usize {
        self.result_sender(topic).await.send(payload).unwrap_or(0)
    }

    /// Creates a new receiver on the result stream for `topic`.
    pub async fn subscribe_results(&self, topic: &str) -> broadcast::Receiver<StreamPayload> {
        self.result_sender(topic).await.subscribe()
    }

    /// Returns the names of all result streams created so far.
    pub async fn result_streams(&self) -> Vec<String> {
        let mut names: Vec<String> = self.results.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    async fn result_sender(&self, topic: &str) -> broadcast::Sender<StreamPayload> {
        let name = result_stream_name(topic);
        {
            let map = self.results.read().await;
            if let Some(sender) = map.get(&name) {
                return sender.clone();
            }
        }
        let mut map = self.results.write().await;
        map.entry(name)
            .or_insert_with(|| broadcast::channel(self.result_capacity).0)
            .clone()
    }
}
