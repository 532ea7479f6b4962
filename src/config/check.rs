//! config::check
//!
//! Typed build, breaking and lint configuration.
//!
//! The rule ids in `use`, `except` and `ignore_only` are not interpreted
//! here; they are carried through to whatever runs the checks. What is
//! checked is the shape: every path is a normalized relative path, every
//! exclude sits under exactly one root, roots don't overlap, and rule ids
//! are non-empty.

use std::collections::BTreeMap;

use thiserror::Error;

use super::external::{
    ExternalBreakingConfig, ExternalBuildConfigV1, ExternalBuildConfigV1Beta1,
    ExternalLintConfig,
};
use crate::core::paths::{contains_path, normalize_and_validate, InvalidPathError};

/// Rule set used by breaking-change detection when none is configured.
pub const DEFAULT_BREAKING_USE: &str = "FILE";

/// Rule set used by lint when none is configured.
pub const DEFAULT_LINT_USE: &str = "DEFAULT";

/// The module root.
const ROOT: &str = ".";

/// A build, breaking or lint block failed validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckError {
    #[error(transparent)]
    InvalidPath(#[from] InvalidPathError),

    #[error("roots '{0}' and '{1}' overlap")]
    OverlappingRoots(String, String),

    #[error("exclude '{0}' is not contained in any root")]
    ExcludeOutsideRoots(String),

    #[error("exclude '{0}' is equal to a root")]
    ExcludeIsRoot(String),

    #[error("rule id cannot be empty")]
    EmptyRuleId,
}

/// Where the module's sources live and what to leave out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    roots: Vec<String>,
    excludes: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            roots: vec![ROOT.to_string()],
            excludes: Vec::new(),
        }
    }
}

impl BuildConfig {
    /// Parse a v1beta1 build block. No roots means the module root.
    ///
    /// # Errors
    ///
    /// Returns `CheckError` if a path is invalid, roots overlap, or an
    /// exclude is not under exactly one root.
    pub fn from_v1beta1(external: &ExternalBuildConfigV1Beta1) -> Result<Self, CheckError> {
        let roots = if external.roots.is_empty() {
            vec![ROOT.to_string()]
        } else {
            external
                .roots
                .iter()
                .map(|root| normalize_root(root))
                .collect::<Result<Vec<_>, _>>()?
        };
        Self::build(roots, &external.excludes)
    }

    /// Parse a v1 build block. The root is always the module root.
    ///
    /// # Errors
    ///
    /// Returns `CheckError` if an exclude path is invalid.
    pub fn from_v1(external: &ExternalBuildConfigV1) -> Result<Self, CheckError> {
        Self::build(vec![ROOT.to_string()], &external.excludes)
    }

    fn build(mut roots: Vec<String>, excludes: &[String]) -> Result<Self, CheckError> {
        roots.sort();
        for (i, a) in roots.iter().enumerate() {
            for b in &roots[i + 1..] {
                if contains_path(a, b) || contains_path(b, a) {
                    return Err(CheckError::OverlappingRoots(a.clone(), b.clone()));
                }
            }
        }

        let mut normalized = Vec::with_capacity(excludes.len());
        for exclude in excludes {
            let exclude = normalize_and_validate(exclude)?;
            if roots.iter().any(|root| *root == exclude) {
                return Err(CheckError::ExcludeIsRoot(exclude));
            }
            if !roots.iter().any(|root| contains_path(root, &exclude)) {
                return Err(CheckError::ExcludeOutsideRoots(exclude));
            }
            normalized.push(exclude);
        }
        normalized.sort();
        normalized.dedup();

        Ok(Self {
            roots,
            excludes: normalized,
        })
    }

    /// Source roots, sorted. `.` is the module root.
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Excluded directories, sorted.
    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    pub fn to_external_v1beta1(&self) -> ExternalBuildConfigV1Beta1 {
        ExternalBuildConfigV1Beta1 {
            roots: self.roots.clone(),
            excludes: self.excludes.clone(),
        }
    }

    /// v1 has no roots; they are dropped.
    pub fn to_external_v1(&self) -> ExternalBuildConfigV1 {
        ExternalBuildConfigV1 {
            excludes: self.excludes.clone(),
        }
    }

    /// Whether `path` is under a root and not under an exclude.
    pub fn includes(&self, path: &str) -> bool {
        self.roots.iter().any(|root| contains_path(root, path))
            && !self.excludes.iter().any(|exclude| contains_path(exclude, path))
    }
}

/// Rule selection shared by breaking and lint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSelection {
    pub use_ids: Vec<String>,
    pub except_ids: Vec<String>,
    pub ignore_paths: Vec<String>,
    pub ignore_only: BTreeMap<String, Vec<String>>,
}

impl RuleSelection {
    fn parse(
        default_use: &str,
        use_ids: &[String],
        except_ids: &[String],
        ignore: &[String],
        ignore_only: &BTreeMap<String, Vec<String>>,
    ) -> Result<Self, CheckError> {
        let use_ids = if use_ids.is_empty() {
            vec![default_use.to_string()]
        } else {
            rule_ids(use_ids)?
        };
        let mut parsed_ignore_only = BTreeMap::new();
        for (id, paths) in ignore_only {
            let id = rule_id(id)?;
            // Keys that differ only in surrounding whitespace name the same rule.
            let merged: &mut Vec<String> = parsed_ignore_only.entry(id).or_default();
            merged.extend(normalize_all(paths)?);
            merged.sort();
            merged.dedup();
        }
        Ok(Self {
            use_ids,
            except_ids: rule_ids(except_ids)?,
            ignore_paths: normalize_all(ignore)?,
            ignore_only: parsed_ignore_only,
        })
    }

    fn with_default(default_use: &str) -> Self {
        Self {
            use_ids: vec![default_use.to_string()],
            ..Default::default()
        }
    }
}

/// Breaking-change detection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakingConfig {
    pub rules: RuleSelection,
    pub ignore_unstable_packages: bool,
}

impl Default for BreakingConfig {
    fn default() -> Self {
        Self {
            rules: RuleSelection::with_default(DEFAULT_BREAKING_USE),
            ignore_unstable_packages: false,
        }
    }
}

impl BreakingConfig {
    /// Parse a breaking block.
    ///
    /// # Errors
    ///
    /// Returns `CheckError` for empty rule ids or invalid ignore paths.
    pub fn from_external(external: &ExternalBreakingConfig) -> Result<Self, CheckError> {
        Ok(Self {
            rules: RuleSelection::parse(
                DEFAULT_BREAKING_USE,
                &external.use_ids,
                &external.except,
                &external.ignore,
                &external.ignore_only,
            )?,
            ignore_unstable_packages: external.ignore_unstable_packages,
        })
    }

    pub fn to_external(&self) -> ExternalBreakingConfig {
        ExternalBreakingConfig {
            use_ids: self.rules.use_ids.clone(),
            except: self.rules.except_ids.clone(),
            ignore: self.rules.ignore_paths.clone(),
            ignore_only: self.rules.ignore_only.clone(),
            ignore_unstable_packages: self.ignore_unstable_packages,
        }
    }
}

/// Lint settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintConfig {
    pub rules: RuleSelection,
    pub enum_zero_value_suffix: String,
    pub rpc_allow_same_request_response: bool,
    pub rpc_allow_google_protobuf_empty_requests: bool,
    pub rpc_allow_google_protobuf_empty_responses: bool,
    pub service_suffix: String,
    pub allow_comment_ignores: bool,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            rules: RuleSelection::with_default(DEFAULT_LINT_USE),
            enum_zero_value_suffix: String::new(),
            rpc_allow_same_request_response: false,
            rpc_allow_google_protobuf_empty_requests: false,
            rpc_allow_google_protobuf_empty_responses: false,
            service_suffix: String::new(),
            allow_comment_ignores: false,
        }
    }
}

impl LintConfig {
    /// Parse a lint block.
    ///
    /// # Errors
    ///
    /// Returns `CheckError` for empty rule ids or invalid ignore paths.
    pub fn from_external(external: &ExternalLintConfig) -> Result<Self, CheckError> {
        Ok(Self {
            rules: RuleSelection::parse(
                DEFAULT_LINT_USE,
                &external.use_ids,
                &external.except,
                &external.ignore,
                &external.ignore_only,
            )?,
            enum_zero_value_suffix: external.enum_zero_value_suffix.clone(),
            rpc_allow_same_request_response: external.rpc_allow_same_request_response,
            rpc_allow_google_protobuf_empty_requests: external
                .rpc_allow_google_protobuf_empty_requests,
            rpc_allow_google_protobuf_empty_responses: external
                .rpc_allow_google_protobuf_empty_responses,
            service_suffix: external.service_suffix.clone(),
            allow_comment_ignores: external.allow_comment_ignores,
        })
    }

    pub fn to_external(&self) -> ExternalLintConfig {
        ExternalLintConfig {
            use_ids: self.rules.use_ids.clone(),
            except: self.rules.except_ids.clone(),
            ignore: self.rules.ignore_paths.clone(),
            ignore_only: self.rules.ignore_only.clone(),
            enum_zero_value_suffix: self.enum_zero_value_suffix.clone(),
            rpc_allow_same_request_response: self.rpc_allow_same_request_response,
            rpc_allow_google_protobuf_empty_requests: self
                .rpc_allow_google_protobuf_empty_requests,
            rpc_allow_google_protobuf_empty_responses: self
                .rpc_allow_google_protobuf_empty_responses,
            service_suffix: self.service_suffix.clone(),
            allow_comment_ignores: self.allow_comment_ignores,
        }
    }
}

fn normalize_root(root: &str) -> Result<String, CheckError> {
    if root == ROOT || root == "./" {
        return Ok(ROOT.to_string());
    }
    Ok(normalize_and_validate(root)?)
}

fn normalize_all(paths: &[String]) -> Result<Vec<String>, CheckError> {
    let mut normalized = paths
        .iter()
        .map(|p| normalize_and_validate(p))
        .collect::<Result<Vec<_>, _>>()?;
    normalized.sort();
    normalized.dedup();
    Ok(normalized)
}

fn rule_id(id: &str) -> Result<String, CheckError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(CheckError::EmptyRuleId);
    }
    Ok(id.to_string())
}

fn rule_ids(ids: &[String]) -> Result<Vec<String>, CheckError> {
    ids.iter().map(|id| rule_id(id)).collect()
}
