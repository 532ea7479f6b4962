//! module
//!
//! The module aggregate: an immutable, extension-filtered file set plus its
//! pinned dependencies.
//!
//! # Construction
//!
//! A [`Module`] is built from one of three sources, all of which funnel
//! into a single private builder:
//!
//! - [`Module::from_payload`] - a decoded wire payload
//! - [`Module::from_bucket`] - a live bucket, pins read from `buf.lock`
//! - [`Module::from_bucket_with_pins`] - a live bucket, pins supplied
//!
//! The builder, in order:
//! 1. rejects pin lists that name an identity twice
//! 2. reads `buf.md` (absence is fine, any other failure is fatal)
//! 3. sorts the pins by identity
//! 4. narrows the bucket to `.proto` files; nothing else is ever visible
//! 5. applies the [`ModuleOptions`] (identity, commit)
//!
//! # Invariants
//!
//! - A module is never mutated after construction and is `Send + Sync`
//! - `dependency_module_pins()` is sorted and unique by identity
//! - Enumeration returns a complete, path-sorted snapshot or an error
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use protomod::core::context::Context;
//! use protomod::module::{Module, ModuleOptions};
//! use protomod::storage::MemBucket;
//!
//! let ctx = Context::background();
//! let bucket = MemBucket::from_files([
//!     ("acme/v1/widget.proto", "syntax = \"proto3\";"),
//!     ("buf.md", "# Widgets"),
//!     ("notes.txt", "not part of the module"),
//! ]).unwrap();
//!
//! let module = Module::from_bucket(&ctx, Arc::new(bucket), ModuleOptions::new()).unwrap();
//! let files = module.source_file_infos(&ctx).unwrap();
//! assert_eq!(files.len(), 1);
//! assert_eq!(files[0].path(), "acme/v1/widget.proto");
//! assert_eq!(module.documentation(), "# Widgets");
//! ```

pub mod file;
pub mod lock;
pub mod payload;

pub use file::{FileInfo, ModuleFile};
pub use lock::LockError;
pub use payload::{ModuleFilePayload, ModulePayload, ModulePinPayload};

use std::sync::Arc;

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use crate::core::context::{Context, ContextError};
use crate::core::paths::{
    validate_module_file_path, InvalidPathError, DOCUMENTATION_FILE_PATH, SOURCE_FILE_EXT,
};
use crate::core::types::{
    module_pins_from_payloads, sort_module_pins, validate_module_pins_unique_by_identity,
    ModuleIdentity, ModulePin, TypeError,
};
use crate::storage::{
    read_optional, ExtFilteredBucket, MemBucket, ReadBucket, StorageError, WriteBucket,
};

/// Errors from module construction and queries.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error(transparent)]
    InvalidPath(#[from] InvalidPathError),

    /// Identity or pin validation failed (duplicate or malformed pins).
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("invalid module payload: {0}")]
    InvalidPayload(String),

    #[error("failed to enumerate module files: {source}")]
    EnumerationFailure { source: StorageError },

    #[error("module file not found: {path}")]
    NotFound { path: String },

    #[error("{DOCUMENTATION_FILE_PATH} is not valid UTF-8")]
    InvalidDocumentation,

    #[error(transparent)]
    Lock(LockError),

    #[error(transparent)]
    Storage(StorageError),

    #[error(transparent)]
    Canceled(#[from] ContextError),
}

impl From<StorageError> for ModuleError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { path } => Self::NotFound { path },
            StorageError::InvalidPath(e) => Self::InvalidPath(e),
            StorageError::Canceled(e) => Self::Canceled(e),
            other => Self::Storage(other),
        }
    }
}

impl From<LockError> for ModuleError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Storage(e) => e.into(),
            LockError::Type(e) => Self::Type(e),
            other => Self::Lock(other),
        }
    }
}

/// Modifiers applied after the module's file set and pins are fixed.
///
/// Both default to unset, which is what a purely local module has.
#[derive(Debug, Clone, Default)]
pub struct ModuleOptions {
    module_identity: Option<ModuleIdentity>,
    commit: Option<String>,
}

impl ModuleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name the module.
    pub fn with_module_identity(mut self, module_identity: ModuleIdentity) -> Self {
        self.module_identity = Some(module_identity);
        self
    }

    /// Record the commit the module was read at.
    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }
}

/// An immutable module.
#[derive(Debug)]
pub struct Module {
    source_bucket: ExtFilteredBucket,
    dependency_module_pins: Vec<ModulePin>,
    module_identity: Option<ModuleIdentity>,
    commit: Option<String>,
    documentation: String,
}

impl Module {
    /// Build a module from a decoded wire payload.
    ///
    /// The payload's files and documentation are written into a fresh
    /// in-memory bucket owned by the module.
    ///
    /// # Errors
    ///
    /// Fails if the payload is invalid, a dependency descriptor is
    /// malformed, or two dependencies share an identity.
    pub fn from_payload(
        ctx: &Context,
        payload: &ModulePayload,
        options: ModuleOptions,
    ) -> Result<Self, ModuleError> {
        payload.validate()?;
        let bucket = MemBucket::new();
        for file in &payload.files {
            bucket.put(ctx, &file.path, &file.content)?;
        }
        if !payload.documentation.is_empty() {
            bucket.put(
                ctx,
                DOCUMENTATION_FILE_PATH,
                payload.documentation.as_bytes(),
            )?;
        }
        let pins = module_pins_from_payloads(&payload.dependencies)?;
        Self::build(ctx, Arc::new(bucket), pins, options)
    }

    /// Build a module from a bucket, reading its pins from `buf.lock`.
    ///
    /// # Errors
    ///
    /// Fails if the lock file cannot be read or parsed, or for any reason
    /// [`Module::from_bucket_with_pins`] fails.
    pub fn from_bucket(
        ctx: &Context,
        bucket: Arc<dyn ReadBucket>,
        options: ModuleOptions,
    ) -> Result<Self, ModuleError> {
        let pins = lock::read_dependency_pins(ctx, &bucket)?;
        Self::build(ctx, bucket, pins, options)
    }

    /// Build a module from a bucket with caller-supplied pins.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::DuplicateDependency` if two pins share an
    /// identity, or a storage error if the documentation cannot be read.
    pub fn from_bucket_with_pins(
        ctx: &Context,
        bucket: Arc<dyn ReadBucket>,
        pins: Vec<ModulePin>,
        options: ModuleOptions,
    ) -> Result<Self, ModuleError> {
        Self::build(ctx, bucket, pins, options)
    }

    fn build(
        ctx: &Context,
        bucket: Arc<dyn ReadBucket>,
        mut pins: Vec<ModulePin>,
        options: ModuleOptions,
    ) -> Result<Self, ModuleError> {
        validate_module_pins_unique_by_identity(&pins)?;

        let documentation = match read_optional(ctx, &bucket, DOCUMENTATION_FILE_PATH)? {
            Some(object) => {
                String::from_utf8(object.data).map_err(|_| ModuleError::InvalidDocumentation)?
            }
            None => String::new(),
        };

        sort_module_pins(&mut pins);
        debug!(
            dependencies = pins.len(),
            has_documentation = !documentation.is_empty(),
            "built module"
        );

        Ok(Self {
            source_bucket: ExtFilteredBucket::new(bucket, SOURCE_FILE_EXT),
            dependency_module_pins: pins,
            module_identity: options.module_identity,
            commit: options.commit,
            documentation,
        })
    }

    /// Files to compile.
    ///
    /// Identical to [`Module::source_file_infos`]; import closures are
    /// resolved elsewhere.
    ///
    /// # Errors
    ///
    /// See [`Module::source_file_infos`].
    pub fn target_file_infos(&self, ctx: &Context) -> Result<Vec<FileInfo>, ModuleError> {
        self.source_file_infos(ctx)
    }

    /// Every source file of the module, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::EnumerationFailure` wrapping the first walk or
    /// path validation error, or `ModuleError::Canceled` if the context
    /// ends mid-walk.
    pub fn source_file_infos(&self, ctx: &Context) -> Result<Vec<FileInfo>, ModuleError> {
        let mut file_infos = Vec::new();
        self.source_bucket
            .walk(ctx, "", &mut |object_info| {
                let file_info = FileInfo::new(
                    &object_info.path,
                    &object_info.external_path,
                    false,
                    self.module_identity.clone(),
                    self.commit.clone(),
                )?;
                file_infos.push(file_info);
                Ok(())
            })
            .map_err(|e| match e {
                StorageError::Canceled(e) => ModuleError::Canceled(e),
                e => ModuleError::EnumerationFailure { source: e },
            })?;
        file_infos.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(file_infos)
    }

    /// Fetch one source file.
    ///
    /// # Errors
    ///
    /// - `ModuleError::InvalidPath` if `path` is not a module file path
    /// - `ModuleError::NotFound` if the module has no such file
    pub fn get_module_file(&self, ctx: &Context, path: &str) -> Result<ModuleFile, ModuleError> {
        validate_module_file_path(path)?;
        let object = self.source_bucket.get(ctx, path)?;
        let info = FileInfo::new(
            &object.info.path,
            &object.info.external_path,
            false,
            self.module_identity.clone(),
            self.commit.clone(),
        )?;
        Ok(ModuleFile::new(info, object.data))
    }

    /// Pinned dependencies, sorted by identity.
    pub fn dependency_module_pins(&self) -> &[ModulePin] {
        &self.dependency_module_pins
    }

    /// Module documentation, empty if there is none.
    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    /// The module's name, unset for local modules.
    pub fn module_identity(&self) -> Option<&ModuleIdentity> {
        self.module_identity.as_ref()
    }

    /// The commit the module was read at, unset for local modules.
    pub fn commit(&self) -> Option<&str> {
        self.commit.as_deref()
    }

    /// Serialize the module back to its wire payload.
    ///
    /// Files are emitted in path order.
    ///
    /// # Errors
    ///
    /// Fails if enumeration or a file read fails.
    pub fn to_payload(&self, ctx: &Context) -> Result<ModulePayload, ModuleError> {
        let file_infos = self.source_file_infos(ctx)?;
        let mut files = Vec::with_capacity(file_infos.len());
        for file_info in &file_infos {
            let object = self.source_bucket.get(ctx, file_info.path())?;
            files.push(ModuleFilePayload {
                path: file_info.path().to_string(),
                content: object.data,
            });
        }
        Ok(ModulePayload {
            files,
            dependencies: self
                .dependency_module_pins
                .iter()
                .map(ModulePin::to_payload)
                .collect(),
            documentation: self.documentation.clone(),
        })
    }

    /// Content digest of the module, `sha256:<hex>`.
    ///
    /// Covers the source file paths and contents and the pinned commits.
    /// Documentation, identity and commit do not contribute.
    ///
    /// # Errors
    ///
    /// Fails if enumeration or a file read fails.
    pub fn digest(&self, ctx: &Context) -> Result<String, ModuleError> {
        let mut hasher = Sha256::new();
        for file_info in self.source_file_infos(ctx)? {
            let object = self.source_bucket.get(ctx, file_info.path())?;
            hasher.update(file_info.path().as_bytes());
            hasher.update(b"\0");
            hasher.update(hex::encode(Sha256::digest(&object.data)).as_bytes());
            hasher.update(b"\n");
        }
        for pin in &self.dependency_module_pins {
            hasher.update(pin.identity().to_string().as_bytes());
            hasher.update(b"\0");
            hasher.update(pin.commit().as_bytes());
            hasher.update(b"\n");
        }
        Ok(format!("sha256:{}", hex::encode(hasher.finalize())))
    }
}
