//! Pure, stateless transforms between the wire shapes.
//!
//! The codec copies only the fields valid at each boundary: scalar fields
//! travel verbatim from the client form to the dispatch form, while binary
//! payloads are deferred to the ingestion server's blob-offload step, which
//! fills in the file references after writing to the blob store.

use crate::domain::SnapshotId;
use crate::error::PipelineError;
use crate::wire::messages::{ClientSnapshot, DispatchSnapshot, ResultEnvelope};

/// Builds the dispatch form of a client snapshot.
///
/// Scalar fields (datetime, user, pose, feelings) are copied verbatim.
/// The image references and the scope `path` start empty; the ingestion
/// server fills them in once the blobs are on disk.
#[must_use]
pub fn dispatch_from_client(snapshot: &ClientSnapshot, uuid: SnapshotId) -> DispatchSnapshot {
    DispatchSnapshot {
        uuid,
        datetime: snapshot.datetime,
        user: snapshot.user.clone(),
        pose: snapshot.pose,
        color_image: None,
        depth_image: None,
        feelings: snapshot.feelings,
        path: String::new(),
    }
}

/// Serializes a dispatch-form snapshot for the snapshot stream.
///
/// # Errors
///
/// Returns [`PipelineError::Internal`] if serialization fails.
pub fn encode_dispatch(snapshot: &DispatchSnapshot) -> Result<Vec<u8>, PipelineError> {
    serde_json::to_vec(snapshot).map_err(|e| PipelineError::Internal(e.to_string()))
}

/// Deserializes a raw published message into the dispatch form.
///
/// # Errors
///
/// Returns [`PipelineError::MalformedSnapshot`] if the bytes do not decode
/// into the dispatch shape.
pub fn decode_dispatch(bytes: &[u8]) -> Result<DispatchSnapshot, PipelineError> {
    serde_json::from_slice(bytes).map_err(|e| PipelineError::MalformedSnapshot(e.to_string()))
}

/// Serializes a result envelope for a topic's result stream.
///
/// # Errors
///
/// Returns [`PipelineError::Internal`] if serialization fails.
pub fn encode_result(envelope: &ResultEnvelope) -> Result<Vec<u8>, PipelineError> {
    serde_json::to_vec(envelope).map_err(|e| PipelineError::Internal(e.to_string()))
}

/// Deserializes a raw result-stream message into a [`ResultEnvelope`].
///
/// # Errors
///
/// Returns [`PipelineError::MalformedSnapshot`] if the bytes do not decode
/// into the envelope shape.
pub fn decode_result(bytes: &[u8]) -> Result<ResultEnvelope, PipelineError> {
    serde_json::from_slice(bytes).map_err(|e| PipelineError::MalformedSnapshot(e.to_string()))
}

/// Maps a topic name to its schema field name (`depth-image` → `depth_image`).
#[must_use]
pub fn field_for_topic(topic: &str) -> String {
    topic.replace('-', "_")
}

/// Encodes depth readings as the little-endian raw blob format.
#[must_use]
pub fn depth_raw_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Decodes a raw depth blob back into readings.
///
/// # Errors
///
/// Returns [`PipelineError::MalformedSnapshot`] if the blob length is not a
/// multiple of four bytes.
pub fn depth_from_raw(bytes: &[u8]) -> Result<Vec<f32>, PipelineError> {
    if !bytes.len().is_multiple_of(4) {
        return Err(PipelineError::MalformedSnapshot(format!(
            "depth blob length {} is not a multiple of 4",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word.copy_from_slice(chunk);
            f32::from_le_bytes(word)
        })
        .collect())
}
