//! storage::traits
//!
//! Bucket trait definitions.
//!
//! # Design
//!
//! A bucket is a key-value facade over files: keys are normalized relative
//! paths (see [`crate::core::paths`]), values are bytes. Readers and writers
//! are separate traits so that a module can hold a read-only view while a
//! config writer only needs `put`.
//!
//! Implementations MUST:
//! - Report missing paths as [`StorageError::NotFound`], never as a generic
//!   read failure, so callers can apply fallback logic
//! - Call [`Context::check`] before each read, write and walk step
//! - Be thread-safe (Send + Sync)

use std::sync::Arc;

use thiserror::Error;

use crate::core::context::{Context, ContextError};
use crate::core::paths::InvalidPathError;

/// Errors from bucket operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Nothing is stored at the path.
    #[error("path not found: {path}")]
    NotFound { path: String },

    /// The path is not a valid bucket key.
    #[error(transparent)]
    InvalidPath(#[from] InvalidPathError),

    /// Failed to read from the bucket.
    #[error("failed to read '{path}': {message}")]
    ReadError { path: String, message: String },

    /// Failed to write to the bucket.
    #[error("failed to write '{path}': {message}")]
    WriteError { path: String, message: String },

    /// The invocation context was canceled or expired.
    #[error(transparent)]
    Canceled(#[from] ContextError),
}

impl StorageError {
    /// Shorthand for a not-found error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Whether this error means the path does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Metadata for one stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Normalized bucket key.
    pub path: String,
    /// Human-facing location, e.g. an absolute path on disk.
    pub external_path: String,
}

impl ObjectInfo {
    /// Object info whose external path is the bucket key itself.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            external_path: path.clone(),
            path,
        }
    }
}

/// A fully read object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadObject {
    pub info: ObjectInfo,
    pub data: Vec<u8>,
}

/// Read access to a bucket.
pub trait ReadBucket: Send + Sync {
    /// Read the object at `path`.
    ///
    /// Returns `StorageError::NotFound` if nothing is stored there.
    fn get(&self, ctx: &Context, path: &str) -> Result<ReadObject, StorageError>;

    /// Look up metadata for the object at `path` without reading it.
    fn stat(&self, ctx: &Context, path: &str) -> Result<ObjectInfo, StorageError>;

    /// Visit every object under `prefix` (`""` for the whole bucket).
    ///
    /// The first error returned by `f` aborts the walk and is returned.
    fn walk(
        &self,
        ctx: &Context,
        prefix: &str,
        f: &mut dyn FnMut(&ObjectInfo) -> Result<(), StorageError>,
    ) -> Result<(), StorageError>;
}

/// Write access to a bucket.
pub trait WriteBucket: Send + Sync {
    /// Store `data` at `path`, replacing any existing object.
    fn put(&self, ctx: &Context, path: &str, data: &[u8]) -> Result<(), StorageError>;
}

impl<T: ReadBucket + ?Sized> ReadBucket for Arc<T> {
    fn get(&self, ctx: &Context, path: &str) -> Result<ReadObject, StorageError> {
        (**self).get(ctx, path)
    }

    fn stat(&self, ctx: &Context, path: &str) -> Result<ObjectInfo, StorageError> {
        (**self).stat(ctx, path)
    }

    fn walk(
        &self,
        ctx: &Context,
        prefix: &str,
        f: &mut dyn FnMut(&ObjectInfo) -> Result<(), StorageError>,
    ) -> Result<(), StorageError> {
        (**self).walk(ctx, prefix, f)
    }
}

impl<T: WriteBucket + ?Sized> WriteBucket for Arc<T> {
    fn put(&self, ctx: &Context, path: &str, data: &[u8]) -> Result<(), StorageError> {
        (**self).put(ctx, path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinguishable() {
        assert!(StorageError::not_found("a.proto").is_not_found());
        let err = StorageError::ReadError {
            path: "a.proto".into(),
            message: "disk on fire".into(),
        };
        assert!(!err.is_not_found());
        assert!(!StorageError::Canceled(ContextError::Canceled).is_not_found());
    }

    #[test]
    fn error_display_formatting() {
        let err = StorageError::not_found("a/b.proto");
        assert_eq!(err.to_string(), "path not found: a/b.proto");

        let err = StorageError::WriteError {
            path: "buf.mod".into(),
            message: "read-only".into(),
        };
        assert!(err.to_string().contains("write"));
        assert!(err.to_string().contains("buf.mod"));
    }
}
