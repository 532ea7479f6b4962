//! storage::os
//!
//! Bucket backed by a directory on the local filesystem.
//!
//! # Semantics
//!
//! - Keys are resolved beneath the root directory; directories themselves
//!   are never objects
//! - External paths are the on-disk paths, for user-facing output
//! - Writes are atomic (write to temp file, then rename)

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::traits::{ObjectInfo, ReadBucket, ReadObject, StorageError, WriteBucket};
use crate::core::context::Context;
use crate::core::paths::normalize_and_validate;

/// Directory-backed bucket.
#[derive(Debug, Clone)]
pub struct OsBucket {
    root: PathBuf,
}

impl OsBucket {
    /// Create a bucket rooted at `root`.
    ///
    /// The directory does not need to exist until it is read or written.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_info(&self, path: String) -> ObjectInfo {
        let external_path = self.root.join(&path).display().to_string();
        ObjectInfo {
            path,
            external_path,
        }
    }
}

fn read_error(path: &str, err: &io::Error) -> StorageError {
    if err.kind() == io::ErrorKind::NotFound {
        StorageError::not_found(path)
    } else {
        StorageError::ReadError {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}

fn write_error(path: &Path, err: &io::Error) -> StorageError {
    StorageError::WriteError {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Convert a path relative to the root into a bucket key.
fn relative_key(relative: &Path) -> Option<String> {
    let mut components = Vec::new();
    for component in relative.components() {
        components.push(component.as_os_str().to_str()?);
    }
    Some(components.join("/"))
}

impl ReadBucket for OsBucket {
    fn get(&self, ctx: &Context, path: &str) -> Result<ReadObject, StorageError> {
        ctx.check()?;
        let path = normalize_and_validate(path)?;
        let full = self.root.join(&path);
        if full.is_dir() {
            return Err(StorageError::not_found(path));
        }
        let data = fs::read(&full).map_err(|e| read_error(&path, &e))?;
        Ok(ReadObject {
            info: self.object_info(path),
            data,
        })
    }

    fn stat(&self, ctx: &Context, path: &str) -> Result<ObjectInfo, StorageError> {
        ctx.check()?;
        let path = normalize_and_validate(path)?;
        let metadata = fs::metadata(self.root.join(&path)).map_err(|e| read_error(&path, &e))?;
        if metadata.is_dir() {
            return Err(StorageError::not_found(path));
        }
        Ok(self.object_info(path))
    }

    fn walk(
        &self,
        ctx: &Context,
        prefix: &str,
        f: &mut dyn FnMut(&ObjectInfo) -> Result<(), StorageError>,
    ) -> Result<(), StorageError> {
        ctx.check()?;
        let start = if prefix.is_empty() {
            self.root.clone()
        } else {
            self.root.join(normalize_and_validate(prefix)?)
        };
        if !start.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(&start).sort_by_file_name() {
            ctx.check()?;
            let entry = entry.map_err(|e| StorageError::ReadError {
                path: start.display().to_string(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.root).map_err(|e| {
                StorageError::ReadError {
                    path: entry.path().display().to_string(),
                    message: e.to_string(),
                }
            })?;
            let key = relative_key(relative).ok_or_else(|| StorageError::ReadError {
                path: entry.path().display().to_string(),
                message: "path is not valid UTF-8".into(),
            })?;
            f(&self.object_info(key))?;
        }
        Ok(())
    }
}

impl WriteBucket for OsBucket {
    fn put(&self, ctx: &Context, path: &str, data: &[u8]) -> Result<(), StorageError> {
        ctx.check()?;
        let path = normalize_and_validate(path)?;
        let full = self.root.join(&path);

        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| write_error(&full, &e))?;
        }

        // Write to temp file in same directory (for atomic rename)
        let mut temp_name = full.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);
        let mut file = fs::File::create(&temp_path).map_err(|e| write_error(&temp_path, &e))?;
        let written = file
            .write_all(data)
            .and_then(|()| file.sync_all())
            .map_err(|e| write_error(&temp_path, &e))
            .and_then(|()| fs::rename(&temp_path, &full).map_err(|e| write_error(&full, &e)));
        drop(file);

        if written.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        written
    }
}
