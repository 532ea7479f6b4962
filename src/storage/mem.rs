//! storage::mem
//!
//! In-memory bucket.
//!
//! Used as the destination when a module is built from a decoded payload,
//! and as a deterministic bucket for tests. Objects are kept in a
//! `BTreeMap`, so walks visit paths in lexicographic order.
//!
//! # Example
//!
//! ```
//! use protomod::core::context::Context;
//! use protomod::storage::{MemBucket, ReadBucket, WriteBucket};
//!
//! let ctx = Context::background();
//! let bucket = MemBucket::new();
//! bucket.put(&ctx, "acme/v1/widget.proto", b"syntax = \"proto3\";").unwrap();
//!
//! let object = bucket.get(&ctx, "acme/v1/widget.proto").unwrap();
//! assert_eq!(object.info.path, "acme/v1/widget.proto");
//! assert!(bucket.get(&ctx, "missing.proto").unwrap_err().is_not_found());
//! ```

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::traits::{ObjectInfo, ReadBucket, ReadObject, StorageError, WriteBucket};
use crate::core::context::Context;
use crate::core::paths::{contains_path, normalize_and_validate};

/// In-memory bucket, readable and writable.
#[derive(Debug, Default)]
pub struct MemBucket {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemBucket {
    /// Create an empty bucket.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bucket holding the given `(path, content)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPath` for the first invalid path.
    pub fn from_files<I, P, C>(files: I) -> Result<Self, StorageError>
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: AsRef<[u8]>,
    {
        let bucket = Self::new();
        let ctx = Context::background();
        for (path, content) in files {
            bucket.put(&ctx, path.as_ref(), content.as_ref())?;
        }
        Ok(bucket)
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    /// Whether the bucket holds no objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned(path: &str) -> StorageError {
    StorageError::ReadError {
        path: path.to_string(),
        message: "bucket lock poisoned".into(),
    }
}

impl ReadBucket for MemBucket {
    fn get(&self, ctx: &Context, path: &str) -> Result<ReadObject, StorageError> {
        ctx.check()?;
        let path = normalize_and_validate(path)?;
        let objects = self.objects.read().map_err(|_| poisoned(&path))?;
        match objects.get(&path) {
            Some(data) => Ok(ReadObject {
                info: ObjectInfo::new(path.clone()),
                data: data.clone(),
            }),
            None => Err(StorageError::not_found(path)),
        }
    }

    fn stat(&self, ctx: &Context, path: &str) -> Result<ObjectInfo, StorageError> {
        ctx.check()?;
        let path = normalize_and_validate(path)?;
        let objects = self.objects.read().map_err(|_| poisoned(&path))?;
        if objects.contains_key(&path) {
            Ok(ObjectInfo::new(path))
        } else {
            Err(StorageError::not_found(path))
        }
    }

    fn walk(
        &self,
        ctx: &Context,
        prefix: &str,
        f: &mut dyn FnMut(&ObjectInfo) -> Result<(), StorageError>,
    ) -> Result<(), StorageError> {
        ctx.check()?;
        let prefix = if prefix.is_empty() {
            ".".to_string()
        } else {
            normalize_and_validate(prefix)?
        };
        // Snapshot the keys so `f` never runs under the lock.
        let paths: Vec<String> = {
            let objects = self.objects.read().map_err(|_| poisoned(&prefix))?;
            objects
                .keys()
                .filter(|path| contains_path(&prefix, path))
                .cloned()
                .collect()
        };
        for path in paths {
            ctx.check()?;
            f(&ObjectInfo::new(path))?;
        }
        Ok(())
    }
}

impl WriteBucket for MemBucket {
    fn put(&self, ctx: &Context, path: &str, data: &[u8]) -> Result<(), StorageError> {
        ctx.check()?;
        let path = normalize_and_validate(path)?;
        let mut objects = self.objects.write().map_err(|_| StorageError::WriteError {
            path: path.clone(),
            message: "bucket lock poisoned".into(),
        })?;
        objects.insert(path, data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::ContextError;

    fn walk_paths(bucket: &MemBucket, prefix: &str) -> Vec<String> {
        let mut paths = Vec::new();
        bucket
            .walk(&Context::background(), prefix, &mut |info| {
                paths.push(info.path.clone());
                Ok(())
            })
            .unwrap();
        paths
    }

    #[test]
    fn put_normalizes_paths() {
        let ctx = Context::background();
        let bucket = MemBucket::new();
        bucket.put(&ctx, "./a//b.proto", b"x").unwrap();
        assert_eq!(bucket.get(&ctx, "a/b.proto").unwrap().data, b"x");
    }

    #[test]
    fn put_rejects_invalid_paths() {
        let ctx = Context::background();
        let bucket = MemBucket::new();
        let err = bucket.put(&ctx, "../a.proto", b"x").unwrap_err();
        assert!(matches!(err, StorageError::InvalidPath(_)));
        assert!(bucket.is_empty());
    }

    #[test]
    fn walk_in_order_with_prefix() {
        let bucket =
            MemBucket::from_files([("b/x.proto", "1"), ("a/y.proto", "2"), ("ab/z.proto", "3")])
                .unwrap();
        assert_eq!(walk_paths(&bucket, ""), ["a/y.proto", "ab/z.proto", "b/x.proto"]);
        assert_eq!(walk_paths(&bucket, "a"), ["a/y.proto"]);
    }

    #[test]
    fn walk_stops_on_first_error() {
        let bucket = MemBucket::from_files([("a.proto", "1"), ("b.proto", "2")]).unwrap();
        let mut seen = 0;
        let result = bucket.walk(&Context::background(), "", &mut |info| {
            seen += 1;
            Err(StorageError::not_found(info.path.clone()))
        });
        assert!(result.is_err());
        assert_eq!(seen, 1);
    }

    #[test]
    fn canceled_context_aborts() {
        let bucket = MemBucket::from_files([("a.proto", "1")]).unwrap();
        let ctx = Context::background();
        ctx.cancel();
        let err = bucket.get(&ctx, "a.proto").unwrap_err();
        assert!(matches!(err, StorageError::Canceled(ContextError::Canceled)));
    }

    #[test]
    fn stat_reports_not_found() {
        let bucket = MemBucket::new();
        assert!(bucket
            .stat(&Context::background(), "a.proto")
            .unwrap_err()
            .is_not_found());
    }
}
