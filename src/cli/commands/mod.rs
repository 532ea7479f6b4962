//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the module directory as a bucket
//! 2. Calls into the module and config layers
//! 3. Formats and displays output
//!
//! Library errors are wrapped with `anyhow` context at this layer only.

mod completion;
mod config_cmd;
mod deps;
mod init;
mod inspect;
mod ls_files;
mod pack;

pub use completion::completion;
pub use config_cmd::config;
pub use deps::deps;
pub use init::{init, InitArgs};
pub use inspect::inspect;
pub use ls_files::ls_files;
pub use pack::pack;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::args::Command;
use crate::config::{read_config, Config, Provider, ReadConfigOptions};
use crate::core::context::Context;
use crate::module::{Module, ModuleOptions};
use crate::storage::OsBucket;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Init {
            dir,
            name,
            deps,
            doc,
            uncomment,
            config_version,
            force,
        } => init::init(
            ctx,
            &InitArgs {
                dir,
                name,
                deps,
                doc,
                uncomment,
                config_version,
                force,
            },
        ),
        Command::Config {
            dir,
            override_config,
        } => config_cmd::config(ctx, &dir, override_config.as_deref()),
        Command::LsFiles { dir } => ls_files::ls_files(ctx, &dir),
        Command::Deps { dir } => deps::deps(ctx, &dir),
        Command::Pack { dir, output } => pack::pack(ctx, &dir, &output),
        Command::Inspect { file } => inspect::inspect(ctx, &file),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Open `dir` as a module, named after its configuration.
fn open_module(ctx: &Context, dir: &Path) -> Result<(Module, Config)> {
    if !dir.is_dir() {
        anyhow::bail!("Module directory '{}' does not exist", dir.display());
    }
    let bucket = Arc::new(OsBucket::new(dir));
    let config = read_config(ctx, &Provider::new(), &bucket, ReadConfigOptions::new())
        .context("Failed to read module configuration")?;

    let mut options = ModuleOptions::new();
    if let Some(identity) = &config.module_identity {
        options = options.with_module_identity(identity.clone());
    }
    let module = Module::from_bucket(ctx, bucket, options).context("Failed to open module")?;
    Ok((module, config))
}
