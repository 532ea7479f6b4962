//! ls-files command - List the module's source files

use std::path::Path;

use anyhow::{Context as _, Result};

use super::open_module;
use crate::core::context::Context;

/// Print the external path of every source file the build includes.
pub fn ls_files(ctx: &Context, dir: &Path) -> Result<()> {
    let (module, config) = open_module(ctx, dir)?;
    let file_infos = module
        .target_file_infos(ctx)
        .context("Failed to list module files")?;

    for file_info in file_infos
        .iter()
        .filter(|f| config.build.includes(f.path()))
    {
        println!("{}", file_info.external_path());
    }
    Ok(())
}
