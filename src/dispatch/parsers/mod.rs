//! Built-in processing units.
//!
//! Four units ship with the gateway, covering both parser shapes: `pose`
//! is a bare function lifted through [`FnParser`], while `feelings`,
//! `color-image`, and `depth-image` are struct-shaped units. The startup
//! registration pass hands [`builtin_parsers`] to the registry; deployments
//! can register additional units at any time.

pub mod color_image;
pub mod depth_image;
pub mod feelings;
pub mod pose;

pub use color_image::ColorImageParser;
pub use depth_image::DepthImageParser;
pub use feelings::FeelingsParser;
pub use pose::parse_pose;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::{FnParser, SnapshotParser};

/// Result payload shared by the image-deriving units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    /// Artifact width in pixels.
    pub width: u32,
    /// Artifact height in pixels.
    pub height: u32,
    /// Absolute path of the derived artifact on disk.
    pub path: String,
}

/// Decodes an image field payload into its file reference.
pub(crate) fn decode_image_ref(
    payload: serde_json::Value,
) -> Result<crate::wire::ImageRef, crate::error::PipelineError> {
    serde_json::from_value(payload).map_err(|e| {
        crate::error::PipelineError::MalformedSnapshot(format!("image field payload: {e}"))
    })
}

/// Returns the fixed set of built-in parsers registered at startup.
#[must_use]
pub fn builtin_parsers() -> Vec<Arc<dyn SnapshotParser>> {
    vec![
        Arc::new(FnParser::new(pose::TOPIC, pose::parse_pose)),
        Arc::new(FeelingsParser),
        Arc::new(ColorImageParser),
        Arc::new(DepthImageParser),
    ]
}
