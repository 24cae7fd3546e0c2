//! Per-dispatch blob scope handle passed to parsers.
//!
//! A [`Context`] binds one parser invocation to one snapshot's scope
//! directory. It is constructed from the `path` field carried in the
//! dispatched message, not from `(user_id, uuid)`, and validates the
//! scope up front so a malformed or empty path fails before any parser
//! runs.

use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::storage::scoped_file;

/// Scoped handle to one snapshot's blob directory.
///
/// All operations resolve plain file names inside the scope; a context can
/// never touch files outside its own directory.
#[derive(Debug, Clone)]
pub struct Context {
    scope: PathBuf,
}

impl Context {
    /// Binds a context to the scope directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Scope`] if `path` is empty or is not an
    /// existing directory.
    pub fn new(path: &str) -> Result<Self, PipelineError> {
        if path.is_empty() {
            return Err(PipelineError::Scope("empty scope path".to_string()));
        }
        let scope = PathBuf::from(path);
        if !scope.is_dir() {
            return Err(PipelineError::Scope(format!(
                "scope path is not an existing directory: {path}"
            )));
        }
        Ok(Self { scope })
    }

    /// Returns the scope directory this context is bound to.
    #[must_use]
    pub fn scope(&self) -> &Path {
        &self.scope
    }

    /// Resolves `name` to its absolute path inside the scope.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Scope`] if `name` is not a plain file name.
    pub fn file_path(&self, name: &str) -> Result<PathBuf, PipelineError> {
        scoped_file(&self.scope, name)
    }

    /// Writes binary content to `name`, overwriting if present.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Storage`] on filesystem failure.
    pub async fn save(&self, name: &str, bytes: &[u8]) -> Result<(), PipelineError> {
        let path = self.file_path(name)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| PipelineError::storage(&path, e))
    }

    /// Reads the content of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::BlobNotFound`] if `name` is absent, or
    /// [`PipelineError::Storage`] on other filesystem failures.
    pub async fn load(&self, name: &str) -> Result<Vec<u8>, PipelineError> {
        let path = self.file_path(name)?;
        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PipelineError::BlobNotFound(name.to_string())
            } else {
                PipelineError::storage(&path, e)
            }
        })
    }

    /// Deletes `name` from the scope.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::BlobNotFound`] if `name` is absent, or
    /// [`PipelineError::Storage`] on other filesystem failures.
    pub async fn delete(&self, name: &str) -> Result<(), PipelineError> {
        let path = self.file_path(name)?;
        tokio::fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PipelineError::BlobNotFound(name.to_string())
            } else {
                PipelineError::storage(&path, e)
            }
        })
    }

    /// Returns `true` if `name` exists in the scope.
    pub async fn exists(&self, name: &str) -> bool {
        match self.file_path(name) {
            Ok(path) => tokio::fs::try_exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }
}
