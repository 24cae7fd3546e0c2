//! Parser capability interface and topic-keyed registry.
//!
//! Every processing unit, struct-shaped or a bare function, implements
//! the single [`SnapshotParser`] interface: it declares its topic and maps
//! a field payload plus a blob [`Context`] to a result payload. The
//! [`ParserRegistry`] is a live mapping from topic name to parser, so units
//! registered after the startup registration pass are honored too.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::sync::RwLock;

use crate::error::PipelineError;
use crate::storage::Context;

/// Future returned by a parser invocation.
pub type ParserFuture<'a> = BoxFuture<'a, Result<serde_json::Value, PipelineError>>;

/// Bare-function parser shape: `(field payload, context) -> result payload`.
pub type ParserFn = for<'a> fn(serde_json::Value, &'a Context) -> ParserFuture<'a>;

/// A unit that consumes one topic's slice of a snapshot.
///
/// A parser MAY read and delete files through the [`Context`]; it must not
/// assume a blob still exists after deleting it, and it must tolerate
/// re-invocation on redelivery (re-deriving and overwriting artifacts is
/// acceptable).
pub trait SnapshotParser: Send + Sync + fmt::Debug {
    /// The topic this parser consumes.
    fn topic(&self) -> &str;

    /// Parses one field payload within the given blob scope.
    fn parse<'a>(&'a self, payload: serde_json::Value, context: &'a Context) -> ParserFuture<'a>;
}

/// Adapter that lifts a bare function into the [`SnapshotParser`] interface.
#[derive(Debug)]
pub struct FnParser {
    topic: String,
    parse_fn: ParserFn,
}

impl FnParser {
    /// Binds a bare parse function to a topic.
    #[must_use]
    pub fn new(topic: impl Into<String>, parse_fn: ParserFn) -> Self {
        Self {
            topic: topic.into(),
            parse_fn,
        }
    }
}

impl SnapshotParser for FnParser {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn parse<'a>(&'a self, payload: serde_json::Value, context: &'a Context) -> ParserFuture<'a> {
        (self.parse_fn)(payload, context)
    }
}

/// Live mapping from topic name to registered parser.
///
/// Registration is explicit: the startup pass hands the builtin units to
/// [`register`](Self::register), and later manual registrations are equally
/// valid. The last registration for a topic wins.
#[derive(Debug, Default)]
pub struct ParserRegistry {
    parsers: RwLock<HashMap<String, Arc<dyn SnapshotParser>>>,
}

impl ParserRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parsers: RwLock::new(HashMap::new()),
        }
    }

    /// Associates a parser with its declared topic. Last registration wins.
    pub async fn register(&self, parser: Arc<dyn SnapshotParser>) {
        let topic = parser.topic().to_string();
        let mut map = self.parsers.write().await;
        if map.insert(topic.clone(), parser).is_some() {
            tracing::warn!(%topic, "replacing previously registered parser");
        } else {
            tracing::info!(%topic, "parser registered");
        }
    }

    /// Registers a bare parse function under the given topic.
    pub async fn register_fn(&self, topic: &str, parse_fn: ParserFn) {
        self.register(Arc::new(FnParser::new(topic, parse_fn))).await;
    }

    /// Returns all currently known topics, sorted.
    pub async fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.parsers.read().await.keys().cloned().collect();
        topics.sort();
        topics
    }

    /// Returns `true` if a parser is registered for `topic`.
    pub async fn contains(&self, topic: &str) -> bool {
        self.parsers.read().await.contains_key(topic)
    }

    /// Looks up and invokes the parser bound to `topic`.
    ///
    /// The registry lock is released before the parser runs, so a slow
    /// parser never blocks registration or other lookups.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnknownTopic`] if `topic` was never
    /// registered, or whatever error the parser itself produces.
    pub async fn invoke(
        &self,
        topic: &str,
        payload: serde_json::Value,
        context: &Context,
    ) -> Result<serde_json::Value, PipelineError> {
        let parser = {
            let map = self.parsers.read().await;
            map.get(topic)
                .cloned()
                .ok_or_else(|| PipelineError::UnknownTopic(topic.to_string()))?
        };
        parser.parse(payload, context).await
    }

    /// Returns the number of registered parsers.
    pub async fn len(&self) -> usize {
        self.parsers.read().await.len()
    }

    /// Returns `true` if no parser is registered.
    pub async fn is_empty(&self) -> bool {
        self.parsers.read().await.is_empty()
    }
}
