//! init command - Write an initial module configuration

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};

use crate::config::{
    config_exists, write_config, ConfigVersion, WriteConfigOptions, CONFIG_FILE_PATH,
};
use crate::core::context::Context;
use crate::core::types::{ModuleIdentity, ModuleReference};
use crate::storage::OsBucket;

/// Arguments of the init command.
#[derive(Debug, Clone, Default)]
pub struct InitArgs {
    pub dir: PathBuf,
    pub name: Option<String>,
    pub deps: Vec<String>,
    pub doc: bool,
    pub uncomment: bool,
    pub config_version: Option<String>,
    pub force: bool,
}

/// Write `buf.mod` into the module directory.
pub fn init(ctx: &Context, args: &InitArgs) -> Result<()> {
    let mut options = WriteConfigOptions::new();

    if let Some(version) = &args.config_version {
        let version: ConfigVersion = version.parse()?;
        options = options.with_version(version);
    }
    if let Some(name) = &args.name {
        let identity = ModuleIdentity::parse(name).context("Invalid module name")?;
        options = options.with_module_identity(identity);
    }
    if !args.deps.is_empty() {
        let deps = args
            .deps
            .iter()
            .map(|dep| ModuleReference::parse(dep))
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid dependency")?;
        options = options.with_dependency_module_references(deps);
    }
    if args.doc {
        options = options.with_documentation_comments();
    }
    if args.uncomment {
        options = options.with_uncomment();
    }

    fs::create_dir_all(&args.dir)
        .with_context(|| format!("Failed to create '{}'", args.dir.display()))?;
    let bucket = OsBucket::new(&args.dir);

    if !args.force && config_exists(ctx, &bucket)? {
        bail!(
            "A configuration already exists in '{}'. Use --force to overwrite.",
            args.dir.display()
        );
    }

    write_config(ctx, &bucket, options).context("Failed to write configuration")?;
    println!("Wrote {}", args.dir.join(CONFIG_FILE_PATH).display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Provider, ReadConfigOptions};
    use tempfile::TempDir;

    #[test]
    fn writes_named_module() {
        let temp = TempDir::new().unwrap();
        let args = InitArgs {
            dir: temp.path().join("widgets"),
            name: Some("example.com/acme/widgets".into()),
            deps: vec!["example.com/acme/base".into()],
            config_version: Some("v1".into()),
            ..Default::default()
        };
        init(&Context::background(), &args).unwrap();

        let bucket = OsBucket::new(&args.dir);
        let config = crate::config::read_config(
            &Context::background(),
            &Provider::new(),
            &bucket,
            ReadConfigOptions::new(),
        )
        .unwrap();
        assert_eq!(config.version, ConfigVersion::V1);
        assert_eq!(config.dependency_module_references.len(), 1);
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("buf.yaml"), "version: v1\n").unwrap();
        let args = InitArgs {
            dir: temp.path().to_path_buf(),
            ..Default::default()
        };
        assert!(init(&Context::background(), &args).is_err());

        let forced = InitArgs { force: true, ..args };
        init(&Context::background(), &forced).unwrap();
        assert!(temp.path().join(CONFIG_FILE_PATH).exists());
    }

    #[test]
    fn unknown_version_rejected() {
        let temp = TempDir::new().unwrap();
        let args = InitArgs {
            dir: temp.path().to_path_buf(),
            config_version: Some("v2".into()),
            ..Default::default()
        };
        let err = init(&Context::background(), &args).unwrap_err();
        assert!(err.to_string().contains("v2"));
        assert!(!temp.path().join(CONFIG_FILE_PATH).exists());
    }
}
