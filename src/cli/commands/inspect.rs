//! inspect command - Describe a module payload file

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::core::context::Context;
use crate::module::{Module, ModuleOptions, ModulePayload};

/// Build a module from the payload at `file` and describe it.
pub fn inspect(ctx: &Context, file: &Path) -> Result<()> {
    let data = fs::read(file).with_context(|| format!("Failed to read '{}'", file.display()))?;
    let payload = ModulePayload::from_json(&data)?;
    let module = Module::from_payload(ctx, &payload, ModuleOptions::new())
        .context("Invalid module payload")?;

    println!("digest: {}", module.digest(ctx)?);
    if !module.documentation().is_empty() {
        println!("documentation: {} bytes", module.documentation().len());
    }
    println!("dependencies:");
    for pin in module.dependency_module_pins() {
        println!("  {pin}");
    }
    println!("files:");
    for file_info in module.source_file_infos(ctx)? {
        println!("  {}", file_info.path());
    }
    Ok(())
}
