//! Snapshot identity and process-wide id generation.
//!
//! [`SnapshotId`] is a newtype wrapper around a `u64` sequence number so
//! snapshot identifiers cannot be confused with user ids or other integers.
//! [`SnapshotIdGenerator`] issues them under concurrent ingestion.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for an ingested snapshot.
///
/// Assigned once by the ingestion server and immutable thereafter. Carried
/// by every dispatched message and every parser result, and used as the
/// second level of the blob-store scope directory.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct SnapshotId(u64);

impl SnapshotId {
    /// Creates a `SnapshotId` from a raw sequence number.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw sequence number.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SnapshotId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<SnapshotId> for u64 {
    fn from(id: SnapshotId) -> Self {
        id.0
    }
}

/// Process-wide snapshot id source.
///
/// Backed by a single [`AtomicU64`]; `next_id` is a lock-free O(1)
/// increment with no I/O, safe to call from any number of concurrent
/// ingestion requests. Values are unique and strictly increasing for the
/// lifetime of the process. Ids assigned to requests that later fail are
/// never reused.
#[derive(Debug, Default)]
pub struct SnapshotIdGenerator {
    counter: AtomicU64,
}

impl SnapshotIdGenerator {
    /// Creates a generator starting at id `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    /// Returns the next unique snapshot id.
    #[must_use]
    pub fn next_id(&self) -> SnapshotId {
        SnapshotId(self.counter.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns how many ids have been issued so far.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}
