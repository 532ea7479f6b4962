//! pack command - Write the module as a payload file

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};

use super::open_module;
use crate::core::context::Context;

/// Serialize the module in `dir` to `output` and print its digest.
pub fn pack(ctx: &Context, dir: &Path, output: &Path) -> Result<()> {
    let (module, _) = open_module(ctx, dir)?;
    let payload = module
        .to_payload(ctx)
        .context("Failed to read module files")?;
    payload.validate().context("Module cannot be packed")?;

    let data = payload.to_json()?;
    fs::write(output, data).with_context(|| format!("Failed to write '{}'", output.display()))?;

    println!("{}", module.digest(ctx)?);
    Ok(())
}
