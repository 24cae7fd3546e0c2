//! Dispatch layer: per-topic consumption loops and built-in parsers.

pub mod dispatcher;
pub mod parsers;

pub use dispatcher::{Dispatcher, spawn_for_registered_topics};
