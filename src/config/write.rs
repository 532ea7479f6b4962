//! config::write
//!
//! Initial configuration file writer.
//!
//! The plain form is the serialized on-disk shape. The documented form is
//! rendered line by line so each field can carry a comment; optional
//! fields are emitted commented out with empty values unless uncomment is
//! requested. Either form reads back through the [`Provider`](super::Provider)
//! to the same identity and dependencies it was written with.

use std::collections::BTreeSet;

use tracing::debug;

use super::check::{DEFAULT_BREAKING_USE, DEFAULT_LINT_USE};
use super::external::{ExternalBuildConfigV1Beta1, ExternalConfigV1, ExternalConfigV1Beta1};
use super::{ConfigError, ConfigVersion, CONFIG_FILE_PATH};
use crate::core::context::Context;
use crate::core::types::{ModuleIdentity, ModuleReference};
use crate::storage::WriteBucket;

/// Options for [`write_config`].
///
/// # Example
///
/// ```
/// use protomod::config::{write_config, WriteConfigOptions};
/// use protomod::core::context::Context;
/// use protomod::core::types::ModuleReference;
/// use protomod::storage::MemBucket;
///
/// let ctx = Context::background();
/// let bucket = MemBucket::new();
///
/// // Dependencies need a module name
/// let options = WriteConfigOptions::new().with_dependency_module_references(vec![
///     ModuleReference::parse("example.com/acme/base").unwrap(),
/// ]);
/// assert!(write_config(&ctx, &bucket, options).is_err());
/// assert!(bucket.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct WriteConfigOptions {
    version: ConfigVersion,
    module_identity: Option<ModuleIdentity>,
    dependency_module_references: Vec<ModuleReference>,
    documentation_comments: bool,
    uncomment: bool,
}

impl WriteConfigOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Version of the file format to write. Defaults to v1beta1.
    pub fn with_version(mut self, version: ConfigVersion) -> Self {
        self.version = version;
        self
    }

    /// Name the module.
    pub fn with_module_identity(mut self, module_identity: ModuleIdentity) -> Self {
        self.module_identity = Some(module_identity);
        self
    }

    /// Declare dependencies. Requires a module identity.
    pub fn with_dependency_module_references(
        mut self,
        dependency_module_references: Vec<ModuleReference>,
    ) -> Self {
        self.dependency_module_references = dependency_module_references;
        self
    }

    /// Document every field with a comment.
    pub fn with_documentation_comments(mut self) -> Self {
        self.documentation_comments = true;
        self
    }

    /// Uncomment optional fields. Requires documentation comments.
    pub fn with_uncomment(mut self) -> Self {
        self.uncomment = true;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.dependency_module_references.is_empty() && self.module_identity.is_none() {
            return Err(ConfigError::OptionConflict(
                "dependencies cannot be set without a module name".into(),
            ));
        }
        if self.uncomment && !self.documentation_comments {
            return Err(ConfigError::OptionConflict(
                "uncomment requires documentation comments".into(),
            ));
        }
        let mut seen = BTreeSet::new();
        for dep in &self.dependency_module_references {
            if !seen.insert(dep.identity()) {
                return Err(ConfigError::OptionConflict(format!(
                    "dependency {} is declared more than once",
                    dep.identity()
                )));
            }
        }
        if let Some(identity) = &self.module_identity {
            if let Some(dep) = self
                .dependency_module_references
                .iter()
                .find(|dep| dep.identity() == identity)
            {
                return Err(ConfigError::OptionConflict(format!(
                    "module {identity} cannot depend on itself ({dep})"
                )));
            }
        }
        Ok(())
    }
}

/// Write an initial configuration file to `buf.mod` in the bucket.
///
/// # Errors
///
/// - `ConfigError::OptionConflict` if the options conflict; nothing is
///   written in that case
/// - `ConfigError::SerializeError` or a storage error otherwise
pub fn write_config<B: WriteBucket + ?Sized>(
    ctx: &Context,
    bucket: &B,
    options: WriteConfigOptions,
) -> Result<(), ConfigError> {
    options.validate()?;
    let contents = if options.documentation_comments {
        render_documented(&options)
    } else {
        render_plain(&options)?
    };
    bucket.put(ctx, CONFIG_FILE_PATH, contents.as_bytes())?;
    debug!(
        version = %options.version,
        documented = options.documentation_comments,
        "wrote {CONFIG_FILE_PATH}"
    );
    Ok(())
}

fn render_plain(options: &WriteConfigOptions) -> Result<String, ConfigError> {
    let name = options
        .module_identity
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    let deps: Vec<String> = options
        .dependency_module_references
        .iter()
        .map(ToString::to_string)
        .collect();

    let rendered = match options.version {
        ConfigVersion::V1Beta1 => serde_yaml::to_string(&ExternalConfigV1Beta1 {
            version: options.version.to_string(),
            name,
            deps,
            build: ExternalBuildConfigV1Beta1 {
                roots: vec![".".into()],
                excludes: Vec::new(),
            },
            ..Default::default()
        }),
        ConfigVersion::V1 => serde_yaml::to_string(&ExternalConfigV1 {
            version: options.version.to_string(),
            name,
            deps,
            ..Default::default()
        }),
    };
    rendered.map_err(|e| ConfigError::SerializeError(e.to_string()))
}

/// Line-oriented YAML writer for the documented form.
struct Renderer {
    out: String,
    uncomment: bool,
}

impl Renderer {
    fn comment(&mut self, indent: usize, text: &str) {
        self.push(indent, &format!("# {text}"));
    }

    fn line(&mut self, indent: usize, text: &str) {
        self.push(indent, text);
    }

    /// A field that is commented out unless uncommenting.
    fn optional(&mut self, indent: usize, text: &str) {
        if self.uncomment {
            self.push(indent, text);
        } else {
            self.push(indent, &format!("#{text}"));
        }
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn push(&mut self, indent: usize, text: &str) {
        for _ in 0..indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }
}

/// Quote a scalar for YAML. A JSON string is a valid double-quoted scalar.
fn scalar(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn render_documented(options: &WriteConfigOptions) -> String {
    let mut r = Renderer {
        out: String::new(),
        uncomment: options.uncomment,
    };

    r.comment(0, "This is the module configuration file.");
    r.comment(0, "version is the version of this file's format. It is required.");
    r.line(0, &format!("version: {}", options.version));
    r.blank();

    r.comment(0, "name is the module's name, in the form remote/owner/repository.");
    r.comment(0, "It is only required to publish the module.");
    match &options.module_identity {
        Some(identity) => r.line(0, &format!("name: {}", scalar(&identity.to_string()))),
        None => r.optional(0, "name: \"\""),
    }
    r.blank();

    r.comment(0, "deps are the module's dependencies, in the form");
    r.comment(0, "remote/owner/repository[:reference]. The reference defaults to main.");
    if options.dependency_module_references.is_empty() {
        r.optional(0, "deps: []");
    } else {
        r.line(0, "deps:");
        for dep in &options.dependency_module_references {
            r.line(1, &format!("- {}", scalar(&dep.to_string())));
        }
    }
    r.blank();

    r.comment(0, "build selects the files that make up the module.");
    match options.version {
        ConfigVersion::V1Beta1 => {
            r.line(0, "build:");
            r.comment(1, "roots are the directories that contain source files.");
            r.line(1, "roots:");
            r.line(2, "- .");
            r.comment(1, "excludes are directories under a root to leave out.");
            r.optional(1, "excludes: []");
        }
        ConfigVersion::V1 => {
            r.comment(0, "The module root is the directory holding this file.");
            r.optional(0, "build:");
            r.comment(1, "excludes are directories to leave out.");
            r.optional(1, "excludes: []");
        }
    }
    r.blank();

    r.comment(0, "lint selects the lint rules and their options.");
    r.line(0, "lint:");
    r.comment(1, "use lists the rules or categories to check.");
    r.line(1, "use:");
    r.line(2, &format!("- {DEFAULT_LINT_USE}"));
    r.comment(1, "except removes rules or categories from use.");
    r.optional(1, "except: []");
    r.comment(1, "ignore lists directories or files that are not checked.");
    r.optional(1, "ignore: []");
    r.comment(1, "ignore_only maps a rule id to the paths it is not checked for.");
    r.optional(1, "ignore_only: {}");
    r.comment(1, "enum_zero_value_suffix is the required suffix of zero enum values.");
    r.optional(1, "enum_zero_value_suffix: \"\"");
    r.comment(1, "rpc_allow_same_request_response lets an RPC reuse one message.");
    r.optional(1, "rpc_allow_same_request_response: false");
    r.comment(1, "rpc_allow_google_protobuf_empty_requests allows Empty requests.");
    r.optional(1, "rpc_allow_google_protobuf_empty_requests: false");
    r.comment(1, "rpc_allow_google_protobuf_empty_responses allows Empty responses.");
    r.optional(1, "rpc_allow_google_protobuf_empty_responses: false");
    r.comment(1, "service_suffix is the required suffix of service names.");
    r.optional(1, "service_suffix: \"\"");
    r.comment(1, "allow_comment_ignores honours ignore comments in source files.");
    r.optional(1, "allow_comment_ignores: false");
    r.blank();

    r.comment(0, "breaking selects the breaking-change rules and their options.");
    r.line(0, "breaking:");
    r.comment(1, "use lists the rules or categories to check.");
    r.line(1, "use:");
    r.line(2, &format!("- {DEFAULT_BREAKING_USE}"));
    r.comment(1, "except removes rules or categories from use.");
    r.optional(1, "except: []");
    r.comment(1, "ignore lists directories or files that are not checked.");
    r.optional(1, "ignore: []");
    r.comment(1, "ignore_only maps a rule id to the paths it is not checked for.");
    r.optional(1, "ignore_only: {}");
    r.comment(1, "ignore_unstable_packages skips alpha, beta and test packages.");
    r.optional(1, "ignore_unstable_packages: false");

    r.out
}
