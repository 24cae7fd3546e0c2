//! Color image parser: renders a JPEG artifact from the raw RGB blob.

use image::RgbImage;

use super::{ImageResult, decode_image_ref};
use crate::domain::SnapshotParser;
use crate::domain::parser_registry::ParserFuture;
use crate::error::PipelineError;
use crate::storage::Context;
use crate::wire::COLOR_IMAGE_JPG;

/// Derived-artifact unit for the `color-image` topic.
///
/// Loads the raw `RGB8` blob named by the field payload, encodes it as a
/// JPEG in the same scope, and returns `{width, height, path}`. The raw
/// source is kept; redelivery simply re-derives and overwrites the
/// artifact.
#[derive(Debug, Default)]
pub struct ColorImageParser;

impl SnapshotParser for ColorImageParser {
    fn topic(&self) -> &str {
        "color-image"
    }

    fn parse<'a>(&'a self, payload: serde_json::Value, context: &'a Context) -> ParserFuture<'a> {
        Box::pin(async move {
            let image_ref = decode_image_ref(payload)?;
            let raw = context.load(&image_ref.file_name).await?;

            let expected = (image_ref.width as usize)
                .saturating_mul(image_ref.height as usize)
                .saturating_mul(3);
            if raw.len() != expected {
                return Err(PipelineError::MalformedSnapshot(format!(
                    "color blob holds {} bytes, expected {expected}",
                    raw.len()
                )));
            }

            let Some(pixels) = RgbImage::from_raw(image_ref.width, image_ref.height, raw) else {
                return Err(PipelineError::MalformedSnapshot(
                    "color blob does not fit its declared dimensions".to_string(),
                ));
            };

            let artifact = context.file_path(COLOR_IMAGE_JPG)?;
            pixels.save(&artifact)?;
            tracing::debug!(path = %artifact.display(), "color artifact rendered");

            let result = ImageResult {
                width: image_ref.width,
                height: image_ref.height,
                path: artifact.display().to_string(),
            };
            serde_json::to_value(result).map_err(|e| PipelineError::Internal(e.to_string()))
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::wire::COLOR_IMAGE_RAW;
    use tempfile::TempDir;

    fn scoped(dir: &TempDir) -> Context {
        let Ok(context) = Context::new(&dir.path().display().to_string()) else {
            panic!("scope construction failed");
        };
        context
    }

    fn payload(width: u32, height: u32) -> serde_json::Value {
        serde_json::json!({
            "width": width, "height": height, "file_name": COLOR_IMAGE_RAW,
        })
    }

    #[tokio::test]
    async fn renders_a_jpeg_artifact_and_keeps_the_source() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir creation failed");
        };
        let context = scoped(&dir);
        let Ok(()) = context
            .save(COLOR_IMAGE_RAW, &[255, 0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0])
            .await
        else {
            panic!("setup save failed");
        };

        let parser = ColorImageParser;
        let Ok(result) = parser.parse(payload(2, 2), &context).await else {
            panic!("parse failed");
        };
        let Ok(image_result) = serde_json::from_value::<ImageResult>(result) else {
            panic!("result payload is not an image result");
        };
        assert_eq!(image_result.width, 2);
        assert_eq!(image_result.height, 2);
        assert!(std::path::Path::new(&image_result.path).is_file());
        assert!(context.exists(COLOR_IMAGE_RAW).await, "source must be kept");
    }

    #[tokio::test]
    async fn size_mismatch_is_malformed() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir creation failed");
        };
        let context = scoped(&dir);
        let Ok(()) = context.save(COLOR_IMAGE_RAW, &[1, 2, 3]).await else {
            panic!("setup save failed");
        };

        let parser = ColorImageParser;
        let result = parser.parse(payload(2, 2), &context).await;
        assert!(matches!(result, Err(PipelineError::MalformedSnapshot(_))));
    }

    #[tokio::test]
    async fn missing_source_is_not_found() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir creation failed");
        };
        let context = scoped(&dir);
        let parser = ColorImageParser;
        let result = parser.parse(payload(2, 2), &context).await;
        assert!(matches!(result, Err(PipelineError::BlobNotFound(_))));
    }
}
