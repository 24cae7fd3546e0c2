//! Pose parser: verbatim passthrough of the pose field.

use crate::domain::parser_registry::ParserFuture;
use crate::storage::Context;

/// Topic consumed by [`parse_pose`].
pub const TOPIC: &str = "pose";

/// Returns the pose payload unchanged.
pub fn parse_pose(payload: serde_json::Value, _context: &Context) -> ParserFuture<'_> {
    Box::pin(async move { Ok(payload) })
}
