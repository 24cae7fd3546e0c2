//! Wire message shapes for each pipeline boundary.
//!
//! Three related schema shapes cross the pipeline:
//!
//! - [`ClientSnapshot`]: client to server, binary payloads inline.
//! - [`DispatchSnapshot`]: server to parser, binary payloads replaced by
//!   file references plus the assigned `uuid` and the blob scope `path`.
//! - [`ResultEnvelope`]: parser to saver, shared header plus the
//!   topic-specific result payload.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Feelings, Pose, SnapshotId, User};
use crate::error::PipelineError;

/// Blob name for the raw color image payload.
pub const COLOR_IMAGE_RAW: &str = "color_image.raw";
/// Blob name for the raw depth image payload.
pub const DEPTH_IMAGE_RAW: &str = "depth_image.raw";
/// Artifact name derived from the color image payload.
pub const COLOR_IMAGE_JPG: &str = "color_image.jpg";
/// Artifact name derived from the depth image payload.
pub const DEPTH_IMAGE_JPG: &str = "depth_image.jpg";

/// Inline color image payload in the client form. `data` holds `RGB8`
/// bytes, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageData {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Raw pixel bytes.
    pub data: Vec<u8>,
}

/// Inline depth image payload in the client form. `data` holds one depth
/// reading per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DepthData {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Depth values in meters.
    pub data: Vec<f32>,
}

/// One snapshot as uploaded by the client, fully self-contained.
///
/// Exists only transiently in the ingestion request; the server reshapes
/// it into a [`DispatchSnapshot`] before anything else sees it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientSnapshot {
    /// Reading time as milliseconds since the Unix epoch.
    pub datetime: i64,
    /// The user this snapshot belongs to.
    pub user: User,
    /// Head pose at reading time.
    pub pose: Pose,
    /// Optional inline color image.
    #[serde(default)]
    pub color_image: Option<ImageData>,
    /// Optional inline depth image.
    #[serde(default)]
    pub depth_image: Option<DepthData>,
    /// Cognition readings.
    pub feelings: Feelings,
}

/// File reference to an offloaded binary payload.
///
/// `file_name` is a stable name inside the snapshot's scope directory,
/// chosen by the producing stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageRef {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Blob name inside the snapshot's scope directory.
    pub file_name: String,
}

/// The server-side snapshot shape published to the snapshot stream.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DispatchSnapshot {
    /// Server-assigned unique snapshot id.
    pub uuid: SnapshotId,
    /// Reading time as milliseconds since the Unix epoch.
    pub datetime: i64,
    /// The user this snapshot belongs to.
    pub user: User,
    /// Head pose at reading time.
    pub pose: Pose,
    /// Reference to the offloaded color image, when present.
    #[serde(default)]
    pub color_image: Option<ImageRef>,
    /// Reference to the offloaded depth image, when present.
    #[serde(default)]
    pub depth_image: Option<ImageRef>,
    /// Cognition readings.
    pub feelings: Feelings,
    /// Blob scope directory for this snapshot.
    pub path: String,
}

impl DispatchSnapshot {
    /// Extracts the sub-payload for one schema field.
    ///
    /// Driven purely by the schema's field set; which topics are registered
    /// is none of the codec's business.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MalformedSnapshot`] if the field is not in
    /// the schema or is absent from this snapshot.
    pub fn field_payload(&self, field: &str) -> Result<serde_json::Value, PipelineError> {
        let value = match field {
            "pose" => to_payload(&self.pose)?,
            "feelings" => to_payload(&self.feelings)?,
            "color_image" => match &self.color_image {
                Some(image) => to_payload(image)?,
                None => return Err(absent(field)),
            },
            "depth_image" => match &self.depth_image {
                Some(image) => to_payload(image)?,
                None => return Err(absent(field)),
            },
            _ => {
                return Err(PipelineError::MalformedSnapshot(format!(
                    "no such snapshot field: {field}"
                )));
            }
        };
        Ok(value)
    }

    /// Wraps a parser result with this snapshot's shared header.
    #[must_use]
    pub fn result_envelope(&self, result: serde_json::Value) -> ResultEnvelope {
        ResultEnvelope {
            uuid: self.uuid,
            datetime: self.datetime,
            user: self.user.clone(),
            result,
        }
    }
}

fn to_payload<T: Serialize>(value: &T) -> Result<serde_json::Value, PipelineError> {
    serde_json::to_value(value).map_err(|e| PipelineError::Internal(e.to_string()))
}

fn absent(field: &str) -> PipelineError {
    PipelineError::MalformedSnapshot(format!("field {field} absent from snapshot"))
}

/// One parser result as published to the topic's result stream.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResultEnvelope {
    /// Snapshot id the result belongs to.
    pub uuid: SnapshotId,
    /// Snapshot reading time.
    pub datetime: i64,
    /// The user the snapshot belongs to.
    pub user: User,
    /// Topic-specific result payload.
    pub result: serde_json::Value,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Gender, Rotation, Translation};

    fn sample_dispatch() -> DispatchSnapshot {
        DispatchSnapshot {
            uuid: SnapshotId::from_raw(3),
            datetime: 1000,
            user: User {
                user_id: 7,
                username: "Dan".to_string(),
                birthday: 699_746_400,
                gender: Gender::Other,
            },
            pose: Pose {
                translation: Translation {
                    x: 0.1,
                    y: 0.2,
                    z: 0.3,
                },
                rotation: Rotation {
                    x: 0.0,
                    y: 0.0,
                    z: 0.0,
                    w: 1.0,
                },
            },
            color_image: None,
            depth_image: Some(ImageRef {
                width: 4,
                height: 2,
                file_name: DEPTH_IMAGE_RAW.to_string(),
            }),
            feelings: Feelings {
                hunger: 0.1,
                thirst: 0.2,
                exhaustion: 0.3,
                happiness: 0.4,
            },
            path: "/tmp/data/7/3".to_string(),
        }
    }

    #[test]
    fn field_payload_extracts_present_fields() {
        let snapshot = sample_dispatch();
        let Ok(payload) = snapshot.field_payload("depth_image") else {
            panic!("extraction failed");
        };
        assert_eq!(
            payload.get("file_name").and_then(|v| v.as_str()),
            Some(DEPTH_IMAGE_RAW)
        );
    }

    #[test]
    fn absent_field_is_malformed() {
        let snapshot = sample_dispatch();
        let result = snapshot.field_payload("color_image");
        assert!(matches!(result, Err(PipelineError::MalformedSnapshot(_))));
    }

    #[test]
    fn unknown_field_is_malformed() {
        let snapshot = sample_dispatch();
        let result = snapshot.field_payload("sound");
        assert!(matches!(result, Err(PipelineError::MalformedSnapshot(_))));
    }

    #[test]
    fn result_envelope_carries_the_header() {
        let snapshot = sample_dispatch();
        let envelope = snapshot.result_envelope(serde_json::json!({"ok": true}));
        assert_eq!(envelope.uuid, snapshot.uuid);
        assert_eq!(envelope.datetime, snapshot.datetime);
        assert_eq!(envelope.user, snapshot.user);
    }
}
