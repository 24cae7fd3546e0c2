//! Wire layer: message shapes and the codec between pipeline boundaries.

pub mod codec;
pub mod messages;

pub use messages::{
    COLOR_IMAGE_JPG, COLOR_IMAGE_RAW, ClientSnapshot, DEPTH_IMAGE_JPG, DEPTH_IMAGE_RAW, DepthData,
    DispatchSnapshot, ImageData, ImageRef, ResultEnvelope,
};
