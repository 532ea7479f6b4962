//! config::read
//!
//! CLI-facing configuration lookup: existence check and read with an
//! optional override.

use std::fs;
use std::path::Path;

use tracing::debug;

use super::{Config, ConfigError, Provider, CONFIG_FILE_PATH, LEGACY_CONFIG_FILE_PATH};
use crate::core::context::Context;
use crate::storage::{exists, ReadBucket};

/// Override suffixes that name a file rather than inline data.
const OVERRIDE_FILE_EXTS: [&str; 3] = [".json", ".yaml", ".yml"];

/// Options for [`read_config`].
#[derive(Debug, Clone, Default)]
pub struct ReadConfigOptions {
    override_config: Option<String>,
}

impl ReadConfigOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `override_config` instead of the bucket's config.
    ///
    /// A value ending in `.json`, `.yaml` or `.yml` is read as a file from
    /// the local filesystem; anything else is treated as inline JSON or
    /// YAML. An empty value is ignored.
    pub fn with_override(mut self, override_config: impl Into<String>) -> Self {
        let override_config = override_config.into();
        self.override_config = (!override_config.is_empty()).then_some(override_config);
        self
    }
}

/// Whether the bucket holds a configuration file.
///
/// Checks `buf.mod`, then `buf.yaml`; the same order
/// [`Provider::get_config`] reads them in.
///
/// # Errors
///
/// Propagates bucket errors other than not-found.
pub fn config_exists<B: ReadBucket + ?Sized>(
    ctx: &Context,
    bucket: &B,
) -> Result<bool, ConfigError> {
    if exists(ctx, bucket, CONFIG_FILE_PATH)? {
        return Ok(true);
    }
    Ok(exists(ctx, bucket, LEGACY_CONFIG_FILE_PATH)?)
}

/// Read the configuration from an override or the bucket.
///
/// # Errors
///
/// - `ConfigError::ReadError` if an override file cannot be read
/// - any error from the [`Provider`]
pub fn read_config<B: ReadBucket + ?Sized>(
    ctx: &Context,
    provider: &Provider,
    bucket: &B,
    options: ReadConfigOptions,
) -> Result<Config, ConfigError> {
    let Some(override_config) = options.override_config else {
        return provider.get_config(ctx, bucket);
    };

    if OVERRIDE_FILE_EXTS
        .iter()
        .any(|ext| override_config.ends_with(ext))
    {
        let path = Path::new(&override_config);
        debug!(path = %path.display(), "reading config override file");
        ctx.check()?;
        let data = fs::read(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        return provider.resolve(ctx, &data, &override_config);
    }

    debug!("using inline config override");
    provider.get_config_for_data(ctx, override_config.as_bytes())
}
