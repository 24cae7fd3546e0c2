//! Domain layer: snapshot identity, scalar field types, message streams,
//! and the parser registry.

pub mod broker;
pub mod parser_registry;
pub mod snapshot;
pub mod snapshot_id;

pub use broker::MessageBroker;
pub use parser_registry::{FnParser, ParserRegistry, SnapshotParser};
pub use snapshot::{Feelings, Gender, Pose, Rotation, Translation, User};
pub use snapshot_id::{SnapshotId, SnapshotIdGenerator};
