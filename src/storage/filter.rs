//! storage::filter
//!
//! Read-only view of a bucket restricted to one file extension.
//!
//! Objects outside the extension are invisible through the view: `get` and
//! `stat` report them as not found and `walk` never visits them, even though
//! they remain in the underlying bucket.

use std::sync::Arc;

use super::traits::{ObjectInfo, ReadBucket, ReadObject, StorageError};
use crate::core::context::Context;
use crate::core::paths::ext;

/// Extension-filtered view over a shared bucket.
#[derive(Clone)]
pub struct ExtFilteredBucket {
    inner: Arc<dyn ReadBucket>,
    ext: String,
}

impl ExtFilteredBucket {
    /// Restrict `inner` to paths whose extension is exactly `ext`.
    pub fn new(inner: Arc<dyn ReadBucket>, ext: impl Into<String>) -> Self {
        Self {
            inner,
            ext: ext.into(),
        }
    }

    fn matches(&self, path: &str) -> bool {
        ext(path) == self.ext
    }
}

impl std::fmt::Debug for ExtFilteredBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtFilteredBucket")
            .field("ext", &self.ext)
            .finish_non_exhaustive()
    }
}

impl ReadBucket for ExtFilteredBucket {
    fn get(&self, ctx: &Context, path: &str) -> Result<ReadObject, StorageError> {
        if !self.matches(path) {
            ctx.check()?;
            return Err(StorageError::not_found(path));
        }
        self.inner.get(ctx, path)
    }

    fn stat(&self, ctx: &Context, path: &str) -> Result<ObjectInfo, StorageError> {
        if !self.matches(path) {
            ctx.check()?;
            return Err(StorageError::not_found(path));
        }
        self.inner.stat(ctx, path)
    }

    fn walk(
        &self,
        ctx: &Context,
        prefix: &str,
        f: &mut dyn FnMut(&ObjectInfo) -> Result<(), StorageError>,
    ) -> Result<(), StorageError> {
        self.inner.walk(ctx, prefix, &mut |info| {
            if self.matches(&info.path) {
                f(info)
            } else {
                Ok(())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemBucket;

    fn filtered() -> ExtFilteredBucket {
        let bucket =
            MemBucket::from_files([("a.proto", "1"), ("README.md", "2"), ("b/c.proto", "3")])
                .unwrap();
        ExtFilteredBucket::new(Arc::new(bucket), ".proto")
    }

    #[test]
    fn hides_other_extensions() {
        let view = filtered();
        let ctx = Context::background();
        assert!(view.get(&ctx, "README.md").unwrap_err().is_not_found());
        assert!(view.stat(&ctx, "README.md").unwrap_err().is_not_found());
        assert_eq!(view.get(&ctx, "a.proto").unwrap().data, b"1");
    }

    #[test]
    fn walk_skips_other_extensions() {
        let view = filtered();
        let mut paths = Vec::new();
        view.walk(&Context::background(), "", &mut |info| {
            paths.push(info.path.clone());
            Ok(())
        })
        .unwrap();
        assert_eq!(paths, ["a.proto", "b/c.proto"]);
    }
}
