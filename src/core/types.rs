//! core::types
//!
//! Strong types for module identity and dependency pinning.
//!
//! # Types
//!
//! - [`ModuleIdentity`] - Canonical `remote/owner/repository` name
//! - [`ModuleReference`] - An identity plus a branch, tag or alias
//! - [`ModulePin`] - An identity resolved to one exact commit
//!
//! # Validation
//!
//! These types enforce validity at construction time. A pin list is kept
//! sorted by identity and may never name the same identity twice; see
//! [`sort_module_pins`] and [`validate_module_pins_unique_by_identity`].
//!
//! # Examples
//!
//! ```
//! use protomod::core::types::{ModuleIdentity, ModuleReference};
//!
//! let identity = ModuleIdentity::parse("example.com/acme/widgets").unwrap();
//! assert_eq!(identity.owner(), "acme");
//!
//! let reference = ModuleReference::parse("example.com/acme/base:v1.2.0").unwrap();
//! assert_eq!(reference.reference(), "v1.2.0");
//!
//! assert!(ModuleIdentity::parse("example.com/acme").is_err());
//! ```

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::module::payload::ModulePinPayload;

/// Reference used when a module reference names no branch, tag or alias.
pub const DEFAULT_REFERENCE: &str = "main";

/// Errors from type validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid module identity: {0}")]
    InvalidModuleIdentity(String),

    #[error("invalid module reference: {0}")]
    InvalidModuleReference(String),

    #[error("module {identity} is pinned more than once")]
    DuplicateDependency {
        /// Canonical string of the repeated identity.
        identity: String,
    },

    #[error("malformed dependency: {0}")]
    MalformedDependency(String),
}

/// The canonical name of a module.
///
/// Ordering is by remote, then owner, then repository, which is the order
/// pin lists are kept in.
///
/// # Example
///
/// ```
/// use protomod::core::types::ModuleIdentity;
///
/// let identity = ModuleIdentity::new("example.com", "acme", "widgets").unwrap();
/// assert_eq!(identity.to_string(), "example.com/acme/widgets");
///
/// // Identity comparison is case-sensitive
/// let other = ModuleIdentity::new("example.com", "Acme", "widgets").unwrap();
/// assert_ne!(identity, other);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleIdentity {
    remote: String,
    owner: String,
    repository: String,
}

impl ModuleIdentity {
    /// Create a new validated identity.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidModuleIdentity` if any component is empty
    /// or contains `/`, `:`, `@` or whitespace.
    pub fn new(
        remote: impl Into<String>,
        owner: impl Into<String>,
        repository: impl Into<String>,
    ) -> Result<Self, TypeError> {
        let identity = Self {
            remote: remote.into(),
            owner: owner.into(),
            repository: repository.into(),
        };
        validate_component("remote", &identity.remote)?;
        validate_component("owner", &identity.owner)?;
        validate_component("repository", &identity.repository)?;
        Ok(identity)
    }

    /// Parse `remote/owner/repository`.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidModuleIdentity` unless the string has
    /// exactly three valid components.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let components: Vec<&str> = s.split('/').collect();
        match components.as_slice() {
            [remote, owner, repository] => Self::new(*remote, *owner, *repository),
            _ => Err(TypeError::InvalidModuleIdentity(format!(
                "'{s}' must be in the form remote/owner/repository"
            ))),
        }
    }

    /// The remote host.
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// The owning user or organization.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The repository name.
    pub fn repository(&self) -> &str {
        &self.repository
    }
}

impl TryFrom<String> for ModuleIdentity {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ModuleIdentity> for String {
    fn from(identity: ModuleIdentity) -> Self {
        identity.to_string()
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.remote, self.owner, self.repository)
    }
}

fn validate_component(kind: &str, value: &str) -> Result<(), TypeError> {
    if value.is_empty() {
        return Err(TypeError::InvalidModuleIdentity(format!(
            "{kind} cannot be empty"
        )));
    }
    if let Some(c) = value
        .chars()
        .find(|c| matches!(c, '/' | ':' | '@') || c.is_whitespace() || c.is_control())
    {
        return Err(TypeError::InvalidModuleIdentity(format!(
            "{kind} '{value}' cannot contain {c:?}"
        )));
    }
    Ok(())
}

/// A declared, not yet pinned, dependency.
///
/// The string form is `remote/owner/repository[:reference]`. A missing
/// reference means [`DEFAULT_REFERENCE`], and the default is omitted again
/// when formatting so that parse and format round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleReference {
    identity: ModuleIdentity,
    reference: String,
}

impl ModuleReference {
    /// Create a new validated reference.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidModuleReference` if the reference is empty
    /// or contains `:` or whitespace.
    pub fn new(identity: ModuleIdentity, reference: impl Into<String>) -> Result<Self, TypeError> {
        let reference = reference.into();
        if reference.is_empty() {
            return Err(TypeError::InvalidModuleReference(format!(
                "reference for {identity} cannot be empty"
            )));
        }
        if reference
            .chars()
            .any(|c| c == ':' || c.is_whitespace() || c.is_control())
        {
            return Err(TypeError::InvalidModuleReference(format!(
                "reference '{reference}' for {identity} contains invalid characters"
            )));
        }
        Ok(Self {
            identity,
            reference,
        })
    }

    /// Parse `remote/owner/repository[:reference]`.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidModuleReference` if the identity part or
    /// the reference is invalid.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let (identity, reference) = match s.split_once(':') {
            Some((identity, reference)) => (identity, reference),
            None => (s, DEFAULT_REFERENCE),
        };
        let identity = ModuleIdentity::parse(identity)
            .map_err(|e| TypeError::InvalidModuleReference(format!("'{s}': {e}")))?;
        Self::new(identity, reference)
    }

    /// The referenced module.
    pub fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    /// The branch, tag or alias.
    pub fn reference(&self) -> &str {
        &self.reference
    }
}

impl TryFrom<String> for ModuleReference {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ModuleReference> for String {
    fn from(reference: ModuleReference) -> Self {
        reference.to_string()
    }
}

impl fmt::Display for ModuleReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reference == DEFAULT_REFERENCE {
            write!(f, "{}", self.identity)
        } else {
            write!(f, "{}:{}", self.identity, self.reference)
        }
    }
}

/// A dependency resolved to one exact, reproducible snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModulePin {
    identity: ModuleIdentity,
    branch: String,
    commit: String,
    digest: Option<String>,
    create_time: Option<DateTime<Utc>>,
}

impl ModulePin {
    /// Create a new pin.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::MalformedDependency` if the commit is empty.
    pub fn new(
        identity: ModuleIdentity,
        branch: impl Into<String>,
        commit: impl Into<String>,
    ) -> Result<Self, TypeError> {
        let commit = commit.into();
        if commit.is_empty() {
            return Err(TypeError::MalformedDependency(format!(
                "pin for {identity} has no commit"
            )));
        }
        let branch = branch.into();
        Ok(Self {
            identity,
            branch: if branch.is_empty() {
                DEFAULT_REFERENCE.to_string()
            } else {
                branch
            },
            commit,
            digest: None,
            create_time: None,
        })
    }

    /// Attach the content digest this pin denotes.
    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        let digest = digest.into();
        self.digest = (!digest.is_empty()).then_some(digest);
        self
    }

    /// Attach the time the pinned commit was created.
    pub fn with_create_time(mut self, create_time: DateTime<Utc>) -> Self {
        self.create_time = Some(create_time);
        self
    }

    /// Build a pin from its wire descriptor.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::MalformedDependency` if an identity component or
    /// the commit is missing, or the create time is not RFC3339.
    pub fn from_payload(payload: &ModulePinPayload) -> Result<Self, TypeError> {
        for (field, value) in [
            ("remote", &payload.remote),
            ("owner", &payload.owner),
            ("repository", &payload.repository),
            ("commit", &payload.commit),
        ] {
            if value.is_empty() {
                return Err(TypeError::MalformedDependency(format!(
                    "dependency is missing its {field}"
                )));
            }
        }
        let identity = ModuleIdentity::new(&payload.remote, &payload.owner, &payload.repository)
            .map_err(|e| TypeError::MalformedDependency(e.to_string()))?;
        let mut pin = Self::new(identity, &payload.branch, &payload.commit)?
            .with_digest(payload.digest.clone().unwrap_or_default());
        if let Some(create_time) = &payload.create_time {
            let parsed = DateTime::parse_from_rfc3339(create_time).map_err(|e| {
                TypeError::MalformedDependency(format!(
                    "dependency {} has invalid create_time '{create_time}': {e}",
                    pin.identity
                ))
            })?;
            pin = pin.with_create_time(parsed.with_timezone(&Utc));
        }
        Ok(pin)
    }

    /// Convert to the wire descriptor.
    pub fn to_payload(&self) -> ModulePinPayload {
        ModulePinPayload {
            remote: self.identity.remote.clone(),
            owner: self.identity.owner.clone(),
            repository: self.identity.repository.clone(),
            branch: self.branch.clone(),
            commit: self.commit.clone(),
            digest: self.digest.clone(),
            create_time: self.create_time.map(|t| t.to_rfc3339()),
        }
    }

    /// The pinned module.
    pub fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    /// The branch the commit was resolved from.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// The exact commit.
    pub fn commit(&self) -> &str {
        &self.commit
    }

    /// The content digest, if known.
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// The commit creation time, if known.
    pub fn create_time(&self) -> Option<DateTime<Utc>> {
        self.create_time
    }
}

impl fmt::Display for ModulePin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.identity, self.commit)
    }
}

/// Sort pins by identity (remote, owner, repository).
///
/// The sort is stable.
pub fn sort_module_pins(pins: &mut [ModulePin]) {
    pins.sort_by(|a, b| a.identity.cmp(&b.identity));
}

/// Check that no two pins share an identity.
///
/// # Errors
///
/// Returns `TypeError::DuplicateDependency` naming the first repeated
/// identity.
pub fn validate_module_pins_unique_by_identity(pins: &[ModulePin]) -> Result<(), TypeError> {
    let mut seen = HashSet::with_capacity(pins.len());
    for pin in pins {
        if !seen.insert(&pin.identity) {
            return Err(TypeError::DuplicateDependency {
                identity: pin.identity.to_string(),
            });
        }
    }
    Ok(())
}

/// Decode wire descriptors into pins, in input order.
///
/// # Errors
///
/// Returns `TypeError::MalformedDependency` for the first invalid
/// descriptor.
pub fn module_pins_from_payloads(
    payloads: &[ModulePinPayload],
) -> Result<Vec<ModulePin>, TypeError> {
    payloads.iter().map(ModulePin::from_payload).collect()
}
