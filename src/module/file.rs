//! module::file
//!
//! Per-file descriptors produced on demand by module enumeration.

use crate::core::paths::{validate_module_file_path, InvalidPathError};
use crate::core::types::ModuleIdentity;

/// Descriptor of one module file.
///
/// `path` is always a validated, normalized module file path.
/// `module_identity` and `commit` are `None` for local modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    path: String,
    external_path: String,
    is_import: bool,
    module_identity: Option<ModuleIdentity>,
    commit: Option<String>,
}

impl FileInfo {
    /// Create a new file descriptor.
    ///
    /// An empty `external_path` defaults to `path`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPathError` if `path` is not a valid module file path.
    pub fn new(
        path: &str,
        external_path: &str,
        is_import: bool,
        module_identity: Option<ModuleIdentity>,
        commit: Option<String>,
    ) -> Result<Self, InvalidPathError> {
        let path = validate_module_file_path(path)?;
        let external_path = if external_path.is_empty() {
            path.clone()
        } else {
            external_path.to_string()
        };
        Ok(Self {
            path,
            external_path,
            is_import,
            module_identity,
            commit,
        })
    }

    /// Module-relative path, `/`-separated.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Human-facing path.
    pub fn external_path(&self) -> &str {
        &self.external_path
    }

    /// Whether the file was pulled in from a dependency rather than being
    /// part of the module itself.
    pub fn is_import(&self) -> bool {
        self.is_import
    }

    /// Identity of the owning module.
    pub fn module_identity(&self) -> Option<&ModuleIdentity> {
        self.module_identity.as_ref()
    }

    /// Commit of the owning module.
    pub fn commit(&self) -> Option<&str> {
        self.commit.as_deref()
    }
}

/// A module file with its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFile {
    info: FileInfo,
    content: Vec<u8>,
}

impl ModuleFile {
    pub(crate) fn new(info: FileInfo, content: Vec<u8>) -> Self {
        Self { info, content }
    }

    pub fn info(&self) -> &FileInfo {
        &self.info
    }

    pub fn path(&self) -> &str {
        self.info.path()
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn into_content(self) -> Vec<u8> {
        self.content
    }
}
