//! Per-topic consumption loop over the snapshot stream.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::domain::broker::StreamPayload;
use crate::domain::{MessageBroker, ParserRegistry};
use crate::error::PipelineError;
use crate::storage::Context;
use crate::wire::codec;

/// One logical dispatcher, bound to one topic.
///
/// Every dispatcher holds its own subscription to the snapshot stream, so
/// each sees every snapshot (fan-out, not partitioning). Topics are fully
/// independent: a failure in one dispatcher never blocks another, and no
/// dispatcher assumes another topic's completion.
#[derive(Debug)]
pub struct Dispatcher {
    topic: String,
    registry: Arc<ParserRegistry>,
    broker: MessageBroker,
}

impl Dispatcher {
    /// Creates a dispatcher for `topic`.
    #[must_use]
    pub fn new(topic: impl Into<String>, registry: Arc<ParserRegistry>, broker: MessageBroker) -> Self {
        Self {
            topic: topic.into(),
            registry,
            broker,
        }
    }

    /// Returns the topic this dispatcher consumes.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Runs the consumption loop until the snapshot stream closes.
    ///
    /// Malformed messages, unknown topics, and scope failures are
    /// programming or configuration errors, not transient ones: the message
    /// is logged and dropped, and the loop continues.
    pub async fn run(self, mut stream: broadcast::Receiver<StreamPayload>) {
        tracing::info!(topic = %self.topic, "dispatcher started");
        loop {
            match stream.recv().await {
                Ok(payload) => {
                    if let Err(error) = self.process(&payload).await {
                        tracing::warn!(topic = %self.topic, %error, "message dropped");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(topic = %self.topic, skipped, "dispatcher lagging");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::info!(topic = %self.topic, "snapshot stream closed, dispatcher stopping");
    }

    /// Processes one delivered message end to end.
    async fn process(&self, payload: &[u8]) -> Result<(), PipelineError> {
        let snapshot = codec::decode_dispatch(payload)?;
        let field = codec::field_for_topic(&self.topic);
        let field_payload = snapshot.field_payload(&field)?;
        let context = Context::new(&snapshot.path)?;

        let result = self
            .registry
            .invoke(&self.topic, field_payload, &context)
            .await?;

        let envelope = snapshot.result_envelope(result);
        let bytes = codec::encode_result(&envelope)?;
        let receivers = self.broker.publish_result(&self.topic, bytes).await;
        tracing::debug!(
            topic = %self.topic,
            uuid = %envelope.uuid,
            receivers,
            "result published"
        );
        Ok(())
    }
}

/// Spawns one dispatcher task per currently registered topic.
///
/// Each dispatcher subscribes before its task starts, so snapshots
/// published from this point on are seen by every topic.
pub async fn spawn_for_registered_topics(
    registry: &Arc<ParserRegistry>,
    broker: &MessageBroker,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();
    for topic in registry.topics().await {
        let stream = broker.subscribe_snapshots();
        let dispatcher = Dispatcher::new(topic, Arc::clone(registry), broker.clone());
        handles.push(tokio::spawn(dispatcher.run(stream)));
    }
    handles
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::dispatch::parsers::{ImageResult, builtin_parsers};
    use crate::domain::parser_registry::ParserFuture;
    use crate::domain::{
        Feelings, Gender, Pose, Rotation, SnapshotId, SnapshotParser, Translation, User,
    };
    use crate::service::IngestService;
    use crate::storage::BlobStore;
    use crate::wire::messages::DepthData;
    use crate::wire::{ClientSnapshot, DEPTH_IMAGE_RAW, ResultEnvelope};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::time::timeout;

    fn sample_snapshot() -> ClientSnapshot {
        ClientSnapshot {
            datetime: 1000,
            user: User {
                user_id: 7,
                username: "Dan".to_string(),
                birthday: 699_746_400,
                gender: Gender::Male,
            },
            pose: Pose {
                translation: Translation {
                    x: 0.0,
                    y: 0.0,
                    z: 0.0,
                },
                rotation: Rotation {
                    x: 0.0,
                    y: 0.0,
                    z: 0.0,
                    w: 1.0,
                },
            },
            color_image: None,
            depth_image: None,
            feelings: Feelings {
                hunger: 1.0,
                thirst: 2.0,
                exhaustion: 3.0,
                happiness: 4.0,
            },
        }
    }

    async fn registry_with_builtins() -> Arc<ParserRegistry> {
        let registry = Arc::new(ParserRegistry::new());
        for parser in builtin_parsers() {
            registry.register(parser).await;
        }
        registry
    }

    async fn recv_result(
        rx: &mut broadcast::Receiver<StreamPayload>,
    ) -> ResultEnvelope {
        let Ok(Ok(payload)) = timeout(Duration::from_secs(5), rx.recv()).await else {
            panic!("no result arrived in time");
        };
        let Ok(envelope) = codec::decode_result(&payload) else {
            panic!("result stream carried an undecodable message");
        };
        envelope
    }

    #[tokio::test]
    async fn feelings_snapshot_flows_end_to_end() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir creation failed");
        };
        let broker = MessageBroker::new(16, 16);
        let registry = registry_with_builtins().await;
        let handles = spawn_for_registered_topics(&registry, &broker).await;
        assert_eq!(handles.len(), 4);

        let mut results = broker.subscribe_results("feelings").await;
        let service = IngestService::new(BlobStore::new(dir.path()), broker.clone());
        let Ok(uuid) = service.handle_snapshot(sample_snapshot()).await else {
            panic!("ingestion failed");
        };
        assert_eq!(uuid, SnapshotId::from_raw(0));

        let envelope = recv_result(&mut results).await;
        assert_eq!(envelope.uuid, SnapshotId::from_raw(0));
        assert_eq!(envelope.datetime, 1000);
        assert_eq!(envelope.user.user_id, 7);
        assert_eq!(
            envelope.result,
            serde_json::json!({
                "hunger": 1.0, "thirst": 2.0, "exhaustion": 3.0, "happiness": 4.0,
            })
        );
    }

    #[tokio::test]
    async fn depth_snapshot_yields_artifact_and_consumes_source() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir creation failed");
        };
        let broker = MessageBroker::new(16, 16);
        let registry = registry_with_builtins().await;
        let _handles = spawn_for_registered_topics(&registry, &broker).await;

        let mut results = broker.subscribe_results("depth-image").await;
        let service = IngestService::new(BlobStore::new(dir.path()), broker.clone());

        let mut snapshot = sample_snapshot();
        snapshot.depth_image = Some(DepthData {
            width: 2,
            height: 2,
            data: vec![0.0, 0.5, 1.0, 1.5],
        });
        let Ok(uuid) = service.handle_snapshot(snapshot).await else {
            panic!("ingestion failed");
        };

        let envelope = recv_result(&mut results).await;
        assert_eq!(envelope.uuid, uuid);
        let Ok(image_result) = serde_json::from_value::<ImageResult>(envelope.result) else {
            panic!("result payload is not an image result");
        };
        assert!(std::path::Path::new(&image_result.path).is_file());
        let source = dir
            .path()
            .join("7")
            .join(uuid.to_string())
            .join(DEPTH_IMAGE_RAW);
        assert!(!source.exists(), "raw source must be gone");
    }

    #[derive(Debug)]
    struct AlwaysFailingParser;

    impl SnapshotParser for AlwaysFailingParser {
        fn topic(&self) -> &str {
            "pose"
        }

        fn parse<'a>(
            &'a self,
            _payload: serde_json::Value,
            _context: &'a Context,
        ) -> ParserFuture<'a> {
            Box::pin(async move {
                Err(PipelineError::Internal("this parser always fails".to_string()))
            })
        }
    }

    #[tokio::test]
    async fn failing_topic_does_not_block_other_topics() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir creation failed");
        };
        let broker = MessageBroker::new(16, 16);
        let registry = registry_with_builtins().await;
        registry.register(Arc::new(AlwaysFailingParser)).await;
        let _handles = spawn_for_registered_topics(&registry, &broker).await;

        let mut feelings = broker.subscribe_results("feelings").await;
        let mut pose = broker.subscribe_results("pose").await;
        let service = IngestService::new(BlobStore::new(dir.path()), broker.clone());
        let Ok(_uuid) = service.handle_snapshot(sample_snapshot()).await else {
            panic!("ingestion failed");
        };

        let envelope = recv_result(&mut feelings).await;
        assert_eq!(envelope.user.user_id, 7);

        // The failing pose parser publishes nothing.
        let nothing = timeout(Duration::from_millis(200), pose.recv()).await;
        assert!(nothing.is_err(), "pose stream should stay silent");
    }

    #[tokio::test]
    async fn malformed_message_does_not_kill_the_loop() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir creation failed");
        };
        let broker = MessageBroker::new(16, 16);
        let registry = registry_with_builtins().await;
        let _handles = spawn_for_registered_topics(&registry, &broker).await;

        let mut results = broker.subscribe_results("feelings").await;
        broker.publish_snapshot(b"garbage, not a snapshot".to_vec());

        let service = IngestService::new(BlobStore::new(dir.path()), broker.clone());
        let Ok(uuid) = service.handle_snapshot(sample_snapshot()).await else {
            panic!("ingestion failed");
        };

        let envelope = recv_result(&mut results).await;
        assert_eq!(envelope.uuid, uuid);
    }
}
