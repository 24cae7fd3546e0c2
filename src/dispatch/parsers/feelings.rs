//! Feelings parser: verbatim passthrough of the cognition readings.

use crate::domain::SnapshotParser;
use crate::domain::parser_registry::ParserFuture;
use crate::storage::Context;

/// Passthrough unit for the `feelings` topic.
#[derive(Debug, Default)]
pub struct FeelingsParser;

impl SnapshotParser for FeelingsParser {
    fn topic(&self) -> &str {
        "feelings"
    }

    fn parse<'a>(&'a self, payload: serde_json::Value, _context: &'a Context) -> ParserFuture<'a> {
        Box::pin(async move {
            tracing::debug!("running feelings parser");
            Ok(payload)
        })
    }
}
