//! Filesystem-backed blob storage scoped by `(user_id, snapshot_id)`.
//!
//! Large binary snapshot payloads never travel on the message streams;
//! the ingestion server writes them here and the dispatched message carries
//! file references instead. On-disk layout:
//! `<data-root>/<user_id>/<uuid>/<file-name>`.

pub mod context;

pub use context::Context;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::SnapshotId;
use crate::error::PipelineError;

/// Resolves `name` inside `dir`, rejecting names that could escape the
/// scope directory.
pub(crate) fn scoped_file(dir: &Path, name: &str) -> Result<PathBuf, PipelineError> {
    if name.is_empty()
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
    {
        return Err(PipelineError::Scope(format!("invalid blob name: {name:?}")));
    }
    Ok(dir.join(name))
}

/// The blob-store directory uniquely bound to one `(user_id, uuid)` pair.
///
/// Only constructed by [`BlobStore::ensure_scope`], so holding a `ScopePath`
/// implies the directory exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopePath(PathBuf);

impl ScopePath {
    /// Returns the scope directory path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ScopePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Filesystem-backed scoped storage for large binary payloads.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Creates a blob store rooted at `root`. The directory is created on
    /// first use.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the data root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Idempotently creates the two-level scope directory for
    /// `(user_id, snapshot_id)`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Storage`] if a path component exists but is
    /// not a directory, or on filesystem permission failure.
    pub async fn ensure_scope(
        &self,
        user_id: u64,
        snapshot_id: SnapshotId,
    ) -> Result<ScopePath, PipelineError> {
        let dir = self
            .root
            .join(user_id.to_string())
            .join(snapshot_id.to_string());
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => return Ok(ScopePath(dir)),
            Ok(_) => {
                return Err(PipelineError::storage(
                    &dir,
                    std::io::Error::other("path exists and is not a directory"),
                ));
            }
            Err(_) => {}
        }
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| PipelineError::storage(&dir, e))?;
        Ok(ScopePath(dir))
    }

    /// Writes binary content to `name` under `scope`, overwriting if present.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Storage`] on filesystem failure or
    /// [`PipelineError::Scope`] if `name` is not a plain file name.
    pub async fn write(
        &self,
        scope: &ScopePath,
        name: &str,
        bytes: &[u8],
    ) -> Result<(), PipelineError> {
        let path = scoped_file(scope.as_path(), name)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| PipelineError::storage(&path, e))
    }

    /// Reads the content of `name` under `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::BlobNotFound`] if `name` is absent, or
    /// [`PipelineError::Storage`] on other filesystem failures.
    pub async fn read(&self, scope: &ScopePath, name: &str) -> Result<Vec<u8>, PipelineError> {
        let path = scoped_file(scope.as_path(), name)?;
        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PipelineError::BlobNotFound(name.to_string())
            } else {
                PipelineError::storage(&path, e)
            }
        })
    }

    /// Deletes `name` under `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::BlobNotFound`] if `name` is absent, or
    /// [`PipelineError::Storage`] on other filesystem failures.
    pub async fn delete(&self, scope: &ScopePath, name: &str) -> Result<(), PipelineError> {
        let path = scoped_file(scope.as_path(), name)?;
        tokio::fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PipelineError::BlobNotFound(name.to_string())
            } else {
                PipelineError::storage(&path, e)
            }
        })
    }
}
