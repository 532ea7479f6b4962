//! config::external
//!
//! On-disk configuration shapes, one per supported version.
//!
//! These are pure serialization types. Every field is optional with an
//! empty default and unknown fields are rejected. The provider maps them
//! into [`Config`](super::Config).
//!
//! # v1beta1
//!
//! ```yaml
//! version: v1beta1
//! name: example.com/acme/widgets
//! deps:
//!   - example.com/acme/base
//! build:
//!   roots:
//!     - proto
//!   excludes:
//!     - proto/vendor
//! ```
//!
//! # v1
//!
//! The module root is always `.`, so the build block only carries excludes:
//!
//! ```yaml
//! version: v1
//! build:
//!   excludes:
//!     - vendor
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The v1beta1 configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExternalConfigV1Beta1 {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deps: Vec<String>,
    #[serde(skip_serializing_if = "ExternalBuildConfigV1Beta1::is_empty")]
    pub build: ExternalBuildConfigV1Beta1,
    #[serde(skip_serializing_if = "ExternalBreakingConfig::is_empty")]
    pub breaking: ExternalBreakingConfig,
    #[serde(skip_serializing_if = "ExternalLintConfig::is_empty")]
    pub lint: ExternalLintConfig,
}

/// The v1 configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExternalConfigV1 {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deps: Vec<String>,
    #[serde(skip_serializing_if = "ExternalBuildConfigV1::is_empty")]
    pub build: ExternalBuildConfigV1,
    #[serde(skip_serializing_if = "ExternalBreakingConfig::is_empty")]
    pub breaking: ExternalBreakingConfig,
    #[serde(skip_serializing_if = "ExternalLintConfig::is_empty")]
    pub lint: ExternalLintConfig,
}

/// Only the version field, decoded without rejecting anything else.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalConfigVersion {
    #[serde(default)]
    pub version: String,
}

/// v1beta1 build block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExternalBuildConfigV1Beta1 {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roots: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
}

impl ExternalBuildConfigV1Beta1 {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty() && self.excludes.is_empty()
    }
}

/// v1 build block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExternalBuildConfigV1 {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
}

impl ExternalBuildConfigV1 {
    pub fn is_empty(&self) -> bool {
        self.excludes.is_empty()
    }
}

/// Breaking-change block, shared by both versions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExternalBreakingConfig {
    #[serde(rename = "use", skip_serializing_if = "Vec::is_empty")]
    pub use_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub except: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub ignore_only: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ignore_unstable_packages: bool,
}

impl ExternalBreakingConfig {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Lint block, shared by both versions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExternalLintConfig {
    #[serde(rename = "use", skip_serializing_if = "Vec::is_empty")]
    pub use_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub except: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub ignore_only: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub enum_zero_value_suffix: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub rpc_allow_same_request_response: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub rpc_allow_google_protobuf_empty_requests: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub rpc_allow_google_protobuf_empty_responses: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub service_suffix: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub allow_comment_ignores: bool,
}

impl ExternalLintConfig {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
