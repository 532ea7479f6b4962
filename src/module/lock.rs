//! module::lock
//!
//! Dependency lock file (`buf.lock`) stored alongside the module's sources.
//!
//! # Structure
//!
//! ```yaml
//! # Generated by pmod. DO NOT EDIT.
//! version: v1
//! deps:
//!   - remote: example.com
//!     owner: acme
//!     repository: base
//!     branch: main
//!     commit: 7c0a1b2
//!     digest: sha256:4f...
//!     create_time: 2021-06-01T12:00:00+00:00
//! ```
//!
//! A missing lock file means the module has no dependencies.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::payload::ModulePinPayload;
use crate::core::context::Context;
use crate::core::paths::LOCK_FILE_PATH;
use crate::core::types::{
    module_pins_from_payloads, sort_module_pins, validate_module_pins_unique_by_identity,
    ModulePin, TypeError,
};
use crate::storage::{read_optional, ReadBucket, StorageError, WriteBucket};

/// Current lock file format version.
pub const LOCK_FILE_VERSION: &str = "v1";

const LOCK_FILE_HEADER: &str = "# Generated by pmod. DO NOT EDIT.\n";

/// Errors from lock file operations.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("failed to parse {LOCK_FILE_PATH}: {0}")]
    ParseError(String),

    #[error("unsupported {LOCK_FILE_PATH} version '{0}', supported: {LOCK_FILE_VERSION}")]
    UnsupportedVersion(String),

    #[error("failed to serialize {LOCK_FILE_PATH}: {0}")]
    SerializeError(String),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// On-disk lock file shape.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExternalLockFile {
    #[serde(default)]
    version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    deps: Vec<ModulePinPayload>,
}

/// Read the pinned dependencies recorded in the bucket's lock file.
///
/// Returns an empty list if there is no lock file or it is empty. The pins
/// are returned sorted; uniqueness is checked by the module builder.
///
/// # Errors
///
/// - `LockError::ParseError` for malformed YAML
/// - `LockError::UnsupportedVersion` for any version other than `v1`
/// - `LockError::Type` for malformed dependency entries
/// - `LockError::Storage` for bucket failures other than not-found
pub fn read_dependency_pins<B: ReadBucket + ?Sized>(
    ctx: &Context,
    bucket: &B,
) -> Result<Vec<ModulePin>, LockError> {
    let Some(object) = read_optional(ctx, bucket, LOCK_FILE_PATH)? else {
        debug!("no {LOCK_FILE_PATH} found, module has no dependencies");
        return Ok(Vec::new());
    };
    if object.data.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let lock: ExternalLockFile =
        serde_yaml::from_slice(&object.data).map_err(|e| LockError::ParseError(e.to_string()))?;
    if lock.version != LOCK_FILE_VERSION {
        return Err(LockError::UnsupportedVersion(lock.version));
    }

    let mut pins = module_pins_from_payloads(&lock.deps)?;
    sort_module_pins(&mut pins);
    debug!(count = pins.len(), "read dependency pins from {LOCK_FILE_PATH}");
    Ok(pins)
}

/// Write `pins` to the bucket's lock file, sorted by identity.
///
/// # Errors
///
/// Returns `LockError::Type` if two pins share an identity, or a storage
/// or serialization error.
pub fn write_dependency_pins<B: WriteBucket + ?Sized>(
    ctx: &Context,
    bucket: &B,
    pins: &[ModulePin],
) -> Result<(), LockError> {
    validate_module_pins_unique_by_identity(pins)?;
    let mut sorted = pins.to_vec();
    sort_module_pins(&mut sorted);

    let lock = ExternalLockFile {
        version: LOCK_FILE_VERSION.to_string(),
        deps: sorted.iter().map(ModulePin::to_payload).collect(),
    };
    let body = serde_yaml::to_string(&lock).map_err(|e| LockError::SerializeError(e.to_string()))?;
    let contents = format!("{LOCK_FILE_HEADER}{body}");
    bucket.put(ctx, LOCK_FILE_PATH, contents.as_bytes())?;
    Ok(())
}
