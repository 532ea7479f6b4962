//! deps command - List the module's pinned dependencies

use std::path::Path;

use anyhow::Result;

use super::open_module;
use crate::core::context::Context;

/// Print one line per pinned dependency, sorted by identity.
pub fn deps(ctx: &Context, dir: &Path) -> Result<()> {
    let (module, _) = open_module(ctx, dir)?;
    for pin in module.dependency_module_pins() {
        match pin.digest() {
            Some(digest) => println!(
                "{} {} {} {}",
                pin.identity(),
                pin.branch(),
                pin.commit(),
                digest
            ),
            None => println!("{} {} {}", pin.identity(), pin.branch(), pin.commit()),
        }
    }
    Ok(())
}
