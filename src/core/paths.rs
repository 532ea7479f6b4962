//! core::paths
//!
//! Path validation and the reserved paths of a module's file surface.
//!
//! # Rules
//!
//! Module paths are bucket keys, not OS paths. A valid path:
//! - is non-empty and not the module root itself
//! - is relative (no leading `/`, no drive prefix)
//! - uses `/` as its only separator
//! - has no `..` component
//!
//! Module *source* files must additionally be in normalized form and carry
//! [`SOURCE_FILE_EXT`].
//!
//! # Reserved Paths
//!
//! - [`DOCUMENTATION_FILE_PATH`] - free-form module documentation
//! - [`LOCK_FILE_PATH`] - pinned dependency lock
//!
//! Neither is ever part of the compilable surface since neither carries the
//! source extension.
//!
//! # Example
//!
//! ```
//! use protomod::core::paths::{normalize_and_validate, validate_module_file_path};
//!
//! assert_eq!(normalize_and_validate("a/./b//c.proto").unwrap(), "a/b/c.proto");
//! assert!(normalize_and_validate("../escape.proto").is_err());
//!
//! assert!(validate_module_file_path("acme/v1/widget.proto").is_ok());
//! assert!(validate_module_file_path("acme/v1/README.md").is_err());
//! ```

use thiserror::Error;

/// The only extension that belongs to a module's compilable surface.
pub const SOURCE_FILE_EXT: &str = ".proto";

/// Reserved path holding module documentation.
pub const DOCUMENTATION_FILE_PATH: &str = "buf.md";

/// Reserved path holding the dependency lock.
pub const LOCK_FILE_PATH: &str = "buf.lock";

/// A path failed validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid path '{path}': {reason}")]
pub struct InvalidPathError {
    /// The offending path, as given.
    pub path: String,
    /// Why it was rejected.
    pub reason: String,
}

impl InvalidPathError {
    fn new(path: &str, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Normalize a relative bucket path and validate it.
///
/// `.` components and repeated separators are collapsed.
///
/// # Errors
///
/// Returns `InvalidPathError` if the path is empty, absolute, uses `\`,
/// contains a `..` component, or normalizes to the root.
pub fn normalize_and_validate(path: &str) -> Result<String, InvalidPathError> {
    if path.is_empty() {
        return Err(InvalidPathError::new(path, "path is empty"));
    }
    if path.contains('\\') {
        return Err(InvalidPathError::new(
            path,
            "path must use '/' as its separator",
        ));
    }
    if path.starts_with('/') || has_drive_prefix(path) {
        return Err(InvalidPathError::new(path, "path must be relative"));
    }
    if path.chars().any(|c| c.is_ascii_control()) {
        return Err(InvalidPathError::new(
            path,
            "path cannot contain control characters",
        ));
    }

    let mut components = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => continue,
            ".." => {
                return Err(InvalidPathError::new(
                    path,
                    "path cannot contain '..' components",
                ))
            }
            other => components.push(other),
        }
    }

    if components.is_empty() {
        return Err(InvalidPathError::new(path, "path is the module root"));
    }
    Ok(components.join("/"))
}

/// Validate a module source file path.
///
/// The path must already be normalized and must carry [`SOURCE_FILE_EXT`].
///
/// # Errors
///
/// Returns `InvalidPathError` for any violation of the module path rules.
pub fn validate_module_file_path(path: &str) -> Result<String, InvalidPathError> {
    let normalized = normalize_and_validate(path)?;
    if normalized != path {
        return Err(InvalidPathError::new(
            path,
            format!("path is not normalized, expected '{normalized}'"),
        ));
    }
    if !has_source_ext(&normalized) {
        return Err(InvalidPathError::new(
            path,
            format!("path must have the {SOURCE_FILE_EXT} extension"),
        ));
    }
    Ok(normalized)
}

/// The extension of the last path component, including the dot.
///
/// Returns `""` if the last component has no dot.
pub fn ext(path: &str) -> &str {
    let base = path.rsplit('/').next().unwrap_or(path);
    match base.rfind('.') {
        Some(idx) => &base[idx..],
        None => "",
    }
}

/// Whether the path belongs to the compilable surface by extension.
pub fn has_source_ext(path: &str) -> bool {
    ext(path) == SOURCE_FILE_EXT
}

/// Whether `path` equals `prefix` or lies beneath it.
///
/// Both arguments must be normalized. The root `.` contains everything.
pub fn contains_path(prefix: &str, path: &str) -> bool {
    if prefix == "." {
        return true;
    }
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
