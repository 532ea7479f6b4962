//! cli
//!
//! Command-line interface layer for pmod.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the log subscriber
//! - Build the invocation [`Context`] and delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers open the module directory as an
//! [`OsBucket`](crate::storage::OsBucket) and call into [`crate::module`]
//! and [`crate::config`]; they never touch module files directly.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::time::Duration;

use anyhow::{Context as _, Result};

use crate::core::context::Context;
use crate::logging;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    if cli.debug {
        logging::init("debug", true)
    } else {
        logging::init(logging::DEFAULT_LEVEL, false)
    }
    .context("Failed to initialize logging")?;

    let ctx = match cli.timeout {
        Some(secs) => Context::background().with_timeout(Duration::from_secs(secs)),
        None => Context::background(),
    };

    commands::dispatch(cli.command, &ctx)
}
