//! Depth image parser: renders a visual artifact and consumes the source.

use image::GrayImage;

use super::{ImageResult, decode_image_ref};
use crate::domain::SnapshotParser;
use crate::domain::parser_registry::ParserFuture;
use crate::error::PipelineError;
use crate::storage::Context;
use crate::wire::{DEPTH_IMAGE_JPG, codec};

/// Derived-artifact unit for the `depth-image` topic.
///
/// Loads the raw depth readings named by the field payload, renders a
/// normalized grayscale JPEG in the same scope, deletes the raw source, and
/// returns `{width, height, path}`. A redelivery after the source was
/// consumed is a success no-op returning the existing artifact.
#[derive(Debug, Default)]
pub struct DepthImageParser;

impl SnapshotParser for DepthImageParser {
    fn topic(&self) -> &str {
        "depth-image"
    }

    fn parse<'a>(&'a self, payload: serde_json::Value, context: &'a Context) -> ParserFuture<'a> {
        Box::pin(async move {
            let image_ref = decode_image_ref(payload)?;
            let artifact = context.file_path(DEPTH_IMAGE_JPG)?;

            if !context.exists(&image_ref.file_name).await {
                if context.exists(DEPTH_IMAGE_JPG).await {
                    tracing::debug!(
                        source = %image_ref.file_name,
                        "source already consumed, keeping existing artifact"
                    );
                    return finish(image_ref.width, image_ref.height, &artifact);
                }
                return Err(PipelineError::BlobNotFound(image_ref.file_name));
            }

            let raw = context.load(&image_ref.file_name).await?;
            let values = codec::depth_from_raw(&raw)?;
            let expected = (image_ref.width as usize).saturating_mul(image_ref.height as usize);
            if values.len() != expected {
                return Err(PipelineError::MalformedSnapshot(format!(
                    "depth blob holds {} readings, expected {expected}",
                    values.len()
                )));
            }

            let pixels = normalize(&values);
            let Some(rendered) = GrayImage::from_raw(image_ref.width, image_ref.height, pixels)
            else {
                return Err(PipelineError::MalformedSnapshot(
                    "depth blob does not fit its declared dimensions".to_string(),
                ));
            };
            rendered.save(&artifact)?;
            context.delete(&image_ref.file_name).await?;
            tracing::debug!(path = %artifact.display(), "depth artifact rendered, source deleted");

            finish(image_ref.width, image_ref.height, &artifact)
        })
    }
}

/// Scales readings to the full `u8` range. A flat image maps to mid-gray.
fn normalize(values: &[f32]) -> Vec<u8> {
    let min = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;
    if !range.is_normal() || range <= 0.0 {
        return vec![128; values.len()];
    }
    values
        .iter()
        .map(|v| ((v - min) / range * 255.0) as u8)
        .collect()
}

fn finish(
    width: u32,
    height: u32,
    artifact: &std::path::Path,
) -> Result<serde_json::Value, PipelineError> {
    let result = ImageResult {
        width,
        height,
        path: artifact.display().to_string(),
    };
    serde_json::to_value(result).map_err(|e| PipelineError::Internal(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::wire::DEPTH_IMAGE_RAW;
    use tempfile::TempDir;

    fn scoped(dir: &TempDir) -> Context {
        let Ok(context) = Context::new(&dir.path().display().to_string()) else {
            panic!("scope construction failed");
        };
        context
    }

    fn payload(width: u32, height: u32) -> serde_json::Value {
        serde_json::json!({
            "width": width, "height": height, "file_name": DEPTH_IMAGE_RAW,
        })
    }

    async fn write_source(context: &Context, values: &[f32]) {
        let Ok(()) = context
            .save(DEPTH_IMAGE_RAW, &codec::depth_raw_bytes(values))
            .await
        else {
            panic!("setup save failed");
        };
    }

    #[tokio::test]
    async fn renders_artifact_and_deletes_the_source() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir creation failed");
        };
        let context = scoped(&dir);
        write_source(&context, &[0.0, 1.0, 2.0, 3.0]).await;

        let parser = DepthImageParser;
        let Ok(result) = parser.parse(payload(2, 2), &context).await else {
            panic!("parse failed");
        };
        let Ok(image_result) = serde_json::from_value::<ImageResult>(result) else {
            panic!("result payload is not an image result");
        };
        assert!(std::path::Path::new(&image_result.path).is_file());
        assert!(
            !context.exists(DEPTH_IMAGE_RAW).await,
            "source must be deleted after deriving the artifact"
        );
    }

    #[tokio::test]
    async fn redelivery_after_consumed_source_is_a_no_op() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir creation failed");
        };
        let context = scoped(&dir);
        write_source(&context, &[0.5, 1.5]).await;

        let parser = DepthImageParser;
        let Ok(first) = parser.parse(payload(2, 1), &context).await else {
            panic!("first invocation failed");
        };
        let Ok(second) = parser.parse(payload(2, 1), &context).await else {
            panic!("redelivered invocation should be tolerated");
        };
        assert_eq!(first, second);
        let Ok(image_result) = serde_json::from_value::<ImageResult>(second) else {
            panic!("result payload is not an image result");
        };
        assert!(std::path::Path::new(&image_result.path).is_file());
    }

    #[tokio::test]
    async fn missing_source_without_artifact_is_not_found() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir creation failed");
        };
        let context = scoped(&dir);
        let parser = DepthImageParser;
        let result = parser.parse(payload(2, 1), &context).await;
        assert!(matches!(result, Err(PipelineError::BlobNotFound(_))));
    }

    #[tokio::test]
    async fn reading_count_mismatch_is_malformed() {
        let Ok(dir) = TempDir::new() else {
            panic!("tempdir creation failed");
        };
        let context = scoped(&dir);
        write_source(&context, &[0.0, 1.0, 2.0]).await;

        let parser = DepthImageParser;
        let result = parser.parse(payload(2, 2), &context).await;
        assert!(matches!(result, Err(PipelineError::MalformedSnapshot(_))));
    }

    #[test]
    fn flat_depth_maps_to_mid_gray() {
        assert_eq!(normalize(&[2.0, 2.0, 2.0]), vec![128, 128, 128]);
    }

    #[test]
    fn normalize_spans_the_full_range() {
        let pixels = normalize(&[0.0, 5.0, 10.0]);
        assert_eq!(pixels.first().copied(), Some(0));
        assert_eq!(pixels.last().copied(), Some(255));
    }
}
