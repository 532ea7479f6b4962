//! config command - Print the resolved module configuration

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::config::{read_config, Provider, ReadConfigOptions};
use crate::core::context::Context;
use crate::storage::OsBucket;

/// Resolve the configuration for `dir` and print it as YAML.
pub fn config(ctx: &Context, dir: &Path, override_config: Option<&str>) -> Result<()> {
    let bucket = OsBucket::new(dir);
    let mut options = ReadConfigOptions::new();
    if let Some(override_config) = override_config {
        options = options.with_override(override_config);
    }

    let config = read_config(ctx, &Provider::new(), &bucket, options)
        .context("Failed to read configuration")?;
    print!("{}", config.to_yaml()?);
    Ok(())
}
