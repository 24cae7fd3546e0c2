//! Ingestion service: assigns ids, offloads blobs, publishes dispatch
//! messages.

use crate::domain::{MessageBroker, SnapshotId, SnapshotIdGenerator};
use crate::error::PipelineError;
use crate::storage::BlobStore;
use crate::wire::codec;
use crate::wire::messages::{
    COLOR_IMAGE_RAW, ClientSnapshot, DEPTH_IMAGE_RAW, DispatchSnapshot, ImageRef,
};

/// Orchestration layer for snapshot ingestion.
///
/// Handles one snapshot per call: assign `uuid` → reshape via the wire
/// codec → ensure the blob scope → offload binary payloads → publish the
/// dispatch form to the snapshot stream. Publish happens only after every
/// blob write succeeded, so a dispatcher never sees a message naming a file
/// that is not yet durable.
#[derive(Debug)]
pub struct IngestService {
    ids: SnapshotIdGenerator,
    blobs: BlobStore,
    broker: MessageBroker,
}

impl IngestService {
    /// Creates a new `IngestService`.
    #[must_use]
    pub fn new(blobs: BlobStore, broker: MessageBroker) -> Self {
        Self {
            ids: SnapshotIdGenerator::new(),
            blobs,
            broker,
        }
    }

    /// Returns a reference to the inner [`MessageBroker`].
    #[must_use]
    pub fn broker(&self) -> &MessageBroker {
        &self.broker
    }

    /// Returns a reference to the inner [`BlobStore`].
    #[must_use]
    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    /// Ingests one client-form snapshot and returns its assigned id.
    ///
    /// A storage failure is fatal to this request and nothing is published;
    /// the assigned id is burned, which is acceptable since ids need not be
    /// gap-free.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Storage`] if the blob scope cannot be
    /// created or a payload cannot be written.
    pub async fn handle_snapshot(
        &self,
        snapshot: ClientSnapshot,
    ) -> Result<SnapshotId, PipelineError> {
        validate(&snapshot)?;
        let uuid = self.ids.next_id();
        tracing::info!(user_id = snapshot.user.user_id, %uuid, "handling new snapshot");

        let mut dispatch = codec::dispatch_from_client(&snapshot, uuid);
        let scope = self
            .blobs
            .ensure_scope(snapshot.user.user_id, uuid)
            .await?;

        if let Some(image) = &snapshot.color_image {
            self.blobs.write(&scope, COLOR_IMAGE_RAW, &image.data).await?;
            dispatch.color_image = Some(ImageRef {
                width: image.width,
                height: image.height,
                file_name: COLOR_IMAGE_RAW.to_string(),
            });
        }

        if let Some(depth) = &snapshot.depth_image {
            let raw = codec::depth_raw_bytes(&depth.data);
            self.blobs.write(&scope, DEPTH_IMAGE_RAW, &raw).await?;
            dispatch.depth_image = Some(ImageRef {
                width: depth.width,
                height: depth.height,
                file_name: DEPTH_IMAGE_RAW.to_string(),
            });
        }

        dispatch.path = scope.to_string();
        self.publish(&dispatch)?;
        Ok(uuid)
    }

    fn publish(&self, dispatch: &DispatchSnapshot) -> Result<(), PipelineError> {
        let payload = codec::encode_dispatch(dispatch)?;
        let receivers = self.broker.publish_snapshot(payload);
        tracing::debug!(uuid = %dispatch.uuid, receivers, "snapshot published");
        Ok(())
    }
}

/// Rejects inline payloads whose length does not match their declared
/// dimensions, before an id is assigned or anything touches disk.
fn validate(snapshot: &ClientSnapshot) -> Result<(), PipelineError> {
    if let Some(image) = &snapshot.color_image {
        let expected = (image.width as usize)
            .saturating_mul(image.height as usize)
            .saturating_mul(3);
        if image.data.len() != expected {
            return Err(PipelineError::InvalidRequest(format!(
                "color image holds {} bytes, expected {expected}",
                image.data.len()
            )));
        }
    }
    if let Some(depth) = &snapshot.depth_image {
        let expected = (depth.width as usize).saturating_mul(depth.height as usize);
        if depth.data.len() != expected {
            return Err(PipelineError::InvalidRequest(format!(
                "depth image holds {} readings, expected {expected}",
                depth.data.len()
            )));
        }
    }
    Ok(())
}
