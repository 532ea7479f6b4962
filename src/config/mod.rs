//! config
//!
//! Versioned module configuration.
//!
//! # Locations
//!
//! Searched in order:
//! 1. `buf.mod` (canonical)
//! 2. `buf.yaml` (legacy, warns)
//!
//! If neither exists the default configuration is used.
//!
//! # Versions
//!
//! The `version` field selects the on-disk shape. Recognized versions, in
//! order, are listed in [`ConfigVersion::ALL`]; anything else is a hard
//! error. Resolution is by exact string match only.
//!
//! # Example
//!
//! ```
//! use protomod::config::{ConfigVersion, Provider};
//! use protomod::core::context::Context;
//!
//! let ctx = Context::background();
//! let provider = Provider::new();
//!
//! let config = provider
//!     .get_config_for_data(&ctx, b"version: v1\nname: example.com/acme/widgets\n")
//!     .unwrap();
//! assert_eq!(config.version, ConfigVersion::V1);
//! assert_eq!(config.module_identity.unwrap().to_string(), "example.com/acme/widgets");
//!
//! // Empty input is the default config, never an error
//! let config = provider.get_config_for_data(&ctx, b"").unwrap();
//! assert_eq!(config.version, ConfigVersion::V1Beta1);
//! ```

pub mod check;
pub mod external;
mod read;
mod write;

pub use check::{BreakingConfig, BuildConfig, CheckError, LintConfig, RuleSelection};
pub use external::{ExternalConfigV1, ExternalConfigV1Beta1, ExternalConfigVersion};
pub use read::{config_exists, read_config, ReadConfigOptions};
pub use write::{write_config, WriteConfigOptions};

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::context::{Context, ContextError};
use crate::core::types::{ModuleIdentity, ModuleReference};
use crate::storage::{read_optional, ReadBucket, StorageError};

/// Canonical configuration file path.
pub const CONFIG_FILE_PATH: &str = "buf.mod";

/// Legacy configuration file path, read when the canonical one is absent.
pub const LEGACY_CONFIG_FILE_PATH: &str = "buf.yaml";

/// Origin reported for configuration passed as raw data.
const DATA_ORIGIN: &str = "<data>";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "unsupported config version '{0}', must be one of: {}",
        ConfigVersion::ALL.map(ConfigVersion::as_str).join(", ")
    )]
    UnsupportedVersion(String),

    #[error("failed to parse config from {origin}: {message}")]
    ParseError { origin: String, message: String },

    #[error("conflicting config options: {0}")]
    OptionConflict(String),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize config: {0}")]
    SerializeError(String),

    #[error(transparent)]
    Storage(StorageError),

    #[error(transparent)]
    Canceled(#[from] ContextError),
}

impl From<StorageError> for ConfigError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Canceled(e) => Self::Canceled(e),
            other => Self::Storage(other),
        }
    }
}

impl ConfigError {
    fn parse(origin: &str, message: impl fmt::Display) -> Self {
        Self::ParseError {
            origin: origin.to_string(),
            message: message.to_string(),
        }
    }
}

/// A recognized configuration version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConfigVersion {
    #[default]
    V1Beta1,
    V1,
}

impl ConfigVersion {
    /// Every recognized version, in order.
    pub const ALL: [ConfigVersion; 2] = [ConfigVersion::V1Beta1, ConfigVersion::V1];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigVersion::V1Beta1 => "v1beta1",
            ConfigVersion::V1 => "v1",
        }
    }
}

impl fmt::Display for ConfigVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigVersion::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ConfigError::UnsupportedVersion(s.to_string()))
    }
}

/// Resolved module configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub version: ConfigVersion,
    /// The module's own name, if it is named.
    pub module_identity: Option<ModuleIdentity>,
    /// Declared dependencies, not yet pinned.
    pub dependency_module_references: Vec<ModuleReference>,
    pub build: BuildConfig,
    pub breaking: BreakingConfig,
    pub lint: LintConfig,
}

impl Config {
    /// Render the configuration in the on-disk shape of its version.
    ///
    /// Defaults are written out explicitly, so the output resolves back to
    /// an equal `Config`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::SerializeError` if YAML serialization fails.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        let name = self
            .module_identity
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        let deps: Vec<String> = self
            .dependency_module_references
            .iter()
            .map(ToString::to_string)
            .collect();
        let rendered = match self.version {
            ConfigVersion::V1Beta1 => serde_yaml::to_string(&ExternalConfigV1Beta1 {
                version: self.version.to_string(),
                name,
                deps,
                build: self.build.to_external_v1beta1(),
                breaking: self.breaking.to_external(),
                lint: self.lint.to_external(),
            }),
            ConfigVersion::V1 => serde_yaml::to_string(&ExternalConfigV1 {
                version: self.version.to_string(),
                name,
                deps,
                build: self.build.to_external_v1(),
                breaking: self.breaking.to_external(),
                lint: self.lint.to_external(),
            }),
        };
        rendered.map_err(|e| ConfigError::SerializeError(e.to_string()))
    }
}

/// Resolves configuration from a bucket or raw data.
#[derive(Debug, Clone, Copy, Default)]
pub struct Provider;

impl Provider {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the configuration stored in `bucket`.
    ///
    /// Reads `buf.mod`, falling back to `buf.yaml` with a warning. If
    /// neither exists the default configuration is returned.
    ///
    /// # Errors
    ///
    /// Propagates bucket errors other than not-found, and any error from
    /// [`Provider::get_config_for_data`].
    pub fn get_config<B: ReadBucket + ?Sized>(
        &self,
        ctx: &Context,
        bucket: &B,
    ) -> Result<Config, ConfigError> {
        if let Some(object) = read_optional(ctx, bucket, CONFIG_FILE_PATH)? {
            debug!(path = CONFIG_FILE_PATH, "reading config");
            return self.resolve(ctx, &object.data, CONFIG_FILE_PATH);
        }
        if let Some(object) = read_optional(ctx, bucket, LEGACY_CONFIG_FILE_PATH)? {
            warn!(
                "Using legacy config file '{}'. Please rename to '{}'",
                LEGACY_CONFIG_FILE_PATH, CONFIG_FILE_PATH
            );
            return self.resolve(ctx, &object.data, LEGACY_CONFIG_FILE_PATH);
        }
        debug!("no config file found, using defaults");
        Ok(Config::default())
    }

    /// Resolve configuration from JSON or YAML data.
    ///
    /// Empty data yields the default configuration.
    ///
    /// # Errors
    ///
    /// - `ConfigError::UnsupportedVersion` for an unrecognized or missing
    ///   `version`
    /// - `ConfigError::ParseError` for any decode or validation failure
    pub fn get_config_for_data(&self, ctx: &Context, data: &[u8]) -> Result<Config, ConfigError> {
        self.resolve(ctx, data, DATA_ORIGIN)
    }

    pub(crate) fn resolve(
        &self,
        ctx: &Context,
        data: &[u8],
        origin: &str,
    ) -> Result<Config, ConfigError> {
        ctx.check()?;
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Config::default());
        }

        let sniffed: ExternalConfigVersion =
            serde_yaml::from_slice(data).map_err(|e| ConfigError::parse(origin, e))?;
        let version: ConfigVersion = sniffed.version.parse()?;
        debug!(%version, origin, "resolving config");

        match version {
            ConfigVersion::V1Beta1 => {
                let external: ExternalConfigV1Beta1 =
                    serde_yaml::from_slice(data).map_err(|e| ConfigError::parse(origin, e))?;
                let build = BuildConfig::from_v1beta1(&external.build)
                    .map_err(|e| ConfigError::parse(origin, e))?;
                map_config(
                    version,
                    &external.name,
                    &external.deps,
                    build,
                    &external.breaking,
                    &external.lint,
                    origin,
                )
            }
            ConfigVersion::V1 => {
                let external: ExternalConfigV1 =
                    serde_yaml::from_slice(data).map_err(|e| ConfigError::parse(origin, e))?;
                let build = BuildConfig::from_v1(&external.build)
                    .map_err(|e| ConfigError::parse(origin, e))?;
                map_config(
                    version,
                    &external.name,
                    &external.deps,
                    build,
                    &external.breaking,
                    &external.lint,
                    origin,
                )
            }
        }
    }
}

fn map_config(
    version: ConfigVersion,
    name: &str,
    deps: &[String],
    build: BuildConfig,
    breaking: &external::ExternalBreakingConfig,
    lint: &external::ExternalLintConfig,
    origin: &str,
) -> Result<Config, ConfigError> {
    let module_identity = if name.is_empty() {
        None
    } else {
        Some(ModuleIdentity::parse(name).map_err(|e| ConfigError::parse(origin, e))?)
    };

    let mut seen = HashSet::with_capacity(deps.len());
    let mut dependency_module_references = Vec::with_capacity(deps.len());
    for dep in deps {
        let reference = ModuleReference::parse(dep).map_err(|e| ConfigError::parse(origin, e))?;
        if !seen.insert(reference.identity().clone()) {
            return Err(ConfigError::parse(
                origin,
                format!("dependency {} is declared more than once", reference.identity()),
            ));
        }
        dependency_module_references.push(reference);
    }

    Ok(Config {
        version,
        module_identity,
        dependency_module_references,
        build,
        breaking: BreakingConfig::from_external(breaking)
            .map_err(|e| ConfigError::parse(origin, e))?,
        lint: LintConfig::from_external(lint).map_err(|e| ConfigError::parse(origin, e))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemBucket;

    fn resolve(data: &str) -> Result<Config, ConfigError> {
        Provider::new().get_config_for_data(&Context::background(), data.as_bytes())
    }

    mod versions {
        use super::*;

        #[test]
        fn all_in_order() {
            let names: Vec<&str> = ConfigVersion::ALL.map(ConfigVersion::as_str).to_vec();
            assert_eq!(names, ["v1beta1", "v1"]);
        }

        #[test]
        fn parse_is_exact() {
            assert_eq!("v1".parse::<ConfigVersion>().unwrap(), ConfigVersion::V1);
            assert!("V1".parse::<ConfigVersion>().is_err());
            assert!(" v1".parse::<ConfigVersion>().is_err());
        }
    }

    mod data {
        use super::*;

        #[test]
        fn empty_is_default() {
            let config = resolve("").unwrap();
            assert_eq!(config, Config::default());
            assert_eq!(config.version, ConfigVersion::V1Beta1);
            assert!(config.module_identity.is_none());
            assert_eq!(config.build.roots(), ["."]);
            assert_eq!(config.lint.rules.use_ids, ["DEFAULT"]);
            assert_eq!(config.breaking.rules.use_ids, ["FILE"]);
        }

        #[test]
        fn unsupported_version_named() {
            let err = resolve("version: v2\n").unwrap_err();
            assert!(matches!(err, ConfigError::UnsupportedVersion(ref v) if v == "v2"));
            assert!(err.to_string().contains("v1beta1, v1"));
        }

        #[test]
        fn missing_version_unsupported() {
            let err = resolve("name: example.com/acme/widgets\n").unwrap_err();
            assert!(matches!(err, ConfigError::UnsupportedVersion(ref v) if v.is_empty()));
        }

        #[test]
        fn v1beta1_maps_everything() {
            let config = resolve(
                "version: v1beta1\nname: example.com/acme/widgets\ndeps:\n  - example.com/acme/base:v2\nbuild:\n  roots: [proto]\n",
            )
            .unwrap();
            assert_eq!(config.version, ConfigVersion::V1Beta1);
            assert_eq!(
                config.module_identity,
                Some(ModuleIdentity::parse("example.com/acme/widgets").unwrap())
            );
            assert_eq!(config.dependency_module_references.len(), 1);
            assert_eq!(config.dependency_module_references[0].reference(), "v2");
            assert_eq!(config.build.roots(), ["proto"]);
        }

        #[test]
        fn json_accepted() {
            let config = resolve(r#"{"version": "v1", "deps": ["example.com/acme/base"]}"#).unwrap();
            assert_eq!(config.version, ConfigVersion::V1);
            assert_eq!(
                config.dependency_module_references[0].to_string(),
                "example.com/acme/base"
            );
        }

        #[test]
        fn unknown_field_is_parse_error() {
            let err = resolve("version: v1\nsurprise: true\n").unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { ref origin, .. } if origin == DATA_ORIGIN));
        }

        #[test]
        fn bad_name_is_parse_error() {
            let err = resolve("version: v1\nname: not-an-identity\n").unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { .. }));
        }

        #[test]
        fn duplicate_dependency_is_parse_error() {
            let err = resolve(
                "version: v1\ndeps:\n  - example.com/acme/base\n  - example.com/acme/base:dev\n",
            )
            .unwrap_err();
            assert!(err.to_string().contains("more than once"));
        }

        #[test]
        fn invalid_build_is_parse_error() {
            let err = resolve("version: v1beta1\nbuild:\n  roots: [a, a/b]\n").unwrap_err();
            assert!(err.to_string().contains("overlap"));
        }

        #[test]
        fn malformed_yaml_is_parse_error() {
            let err = resolve("version: [v1\n").unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { .. }));
        }
    }

    mod render {
        use super::*;

        #[test]
        fn to_yaml_resolves_back() {
            for data in [
                "",
                "version: v1\nname: example.com/acme/widgets\nbuild:\n  excludes: [vendor]\n",
                "version: v1beta1\ndeps: [example.com/acme/base:dev]\nbuild:\n  roots: [proto, vendor]\nlint:\n  service_suffix: API\n  ignore_only:\n    FIELD_LOWER_SNAKE_CASE: [proto/legacy]\nbreaking:\n  ignore_unstable_packages: true\n",
            ] {
                let config = resolve(data).unwrap();
                let yaml = config.to_yaml().unwrap();
                assert_eq!(resolve(&yaml).unwrap(), config, "{yaml}");
            }
        }
    }

    mod bucket {
        use super::*;

        #[test]
        fn canonical_preferred_over_legacy() {
            let bucket = MemBucket::from_files([
                (CONFIG_FILE_PATH, "version: v1\n"),
                (LEGACY_CONFIG_FILE_PATH, "version: v1beta1\n"),
            ])
            .unwrap();
            let config = Provider::new()
                .get_config(&Context::background(), &bucket)
                .unwrap();
            assert_eq!(config.version, ConfigVersion::V1);
        }

        #[test]
        fn legacy_fallback() {
            let bucket =
                MemBucket::from_files([(LEGACY_CONFIG_FILE_PATH, "version: v1\n")]).unwrap();
            let config = Provider::new()
                .get_config(&Context::background(), &bucket)
                .unwrap();
            assert_eq!(config.version, ConfigVersion::V1);
        }

        #[test]
        fn neither_is_default() {
            let config = Provider::new()
                .get_config(&Context::background(), &MemBucket::new())
                .unwrap();
            assert_eq!(config, Config::default());
        }

        #[test]
        fn parse_error_names_file() {
            let bucket = MemBucket::from_files([(CONFIG_FILE_PATH, "version: v1\nx: 1\n")]).unwrap();
            let err = Provider::new()
                .get_config(&Context::background(), &bucket)
                .unwrap_err();
            assert!(err.to_string().contains(CONFIG_FILE_PATH));
        }

        #[test]
        fn canceled_context_is_distinct() {
            let ctx = Context::background();
            ctx.cancel();
            let err = Provider::new().get_config(&ctx, &MemBucket::new()).unwrap_err();
            assert!(matches!(err, ConfigError::Canceled(ContextError::Canceled)));
        }
    }
}
