//! storage
//!
//! Bucket abstraction for module files and configuration.
//!
//! # Architecture
//!
//! Every read and write of module content flows through the [`ReadBucket`]
//! and [`WriteBucket`] traits, which have these implementations:
//!
//! - [`MemBucket`]: in-memory, used for decoded payloads and tests
//! - [`OsBucket`]: a directory on the local filesystem
//! - [`ExtFilteredBucket`]: a read-only view restricted to one extension
//!
//! # Example
//!
//! ```
//! use protomod::core::context::Context;
//! use protomod::storage::{exists, MemBucket, WriteBucket};
//!
//! let ctx = Context::background();
//! let bucket = MemBucket::new();
//! bucket.put(&ctx, "buf.yaml", b"version: v1").unwrap();
//!
//! assert!(exists(&ctx, &bucket, "buf.yaml").unwrap());
//! assert!(!exists(&ctx, &bucket, "buf.mod").unwrap());
//! ```

mod filter;
mod mem;
mod os;
mod traits;

pub use filter::ExtFilteredBucket;
pub use mem::MemBucket;
pub use os::OsBucket;
pub use traits::{ObjectInfo, ReadBucket, ReadObject, StorageError, WriteBucket};

use crate::core::context::Context;

/// Check whether an object exists at `path`.
///
/// # Errors
///
/// Propagates every bucket error other than not-found.
pub fn exists<B: ReadBucket + ?Sized>(
    ctx: &Context,
    bucket: &B,
    path: &str,
) -> Result<bool, StorageError> {
    match bucket.stat(ctx, path) {
        Ok(_) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Read the object at `path`, mapping not-found to `None`.
///
/// # Errors
///
/// Propagates every bucket error other than not-found.
pub fn read_optional<B: ReadBucket + ?Sized>(
    ctx: &Context,
    bucket: &B,
    path: &str,
) -> Result<Option<ReadObject>, StorageError> {
    match bucket.get(ctx, path) {
        Ok(object) => Ok(Some(object)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_optional_maps_not_found() {
        let ctx = Context::background();
        let bucket = MemBucket::from_files([("a.proto", "x")]).unwrap();
        assert!(read_optional(&ctx, &bucket, "b.proto").unwrap().is_none());
        assert_eq!(
            read_optional(&ctx, &bucket, "a.proto").unwrap().unwrap().data,
            b"x"
        );
    }

    #[test]
    fn exists_propagates_other_errors() {
        let ctx = Context::background();
        let bucket = MemBucket::new();
        assert!(exists(&ctx, &bucket, "../escape").is_err());
    }
}
