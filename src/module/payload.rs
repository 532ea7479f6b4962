//! module::payload
//!
//! Serialized wire form of a module.
//!
//! # Format
//!
//! A payload is a JSON document carrying every source file (content is
//! base64), the module documentation, and the pinned dependencies:
//!
//! ```json
//! {
//!   "files": [{ "path": "acme/v1/widget.proto", "content": "c3ludGF4..." }],
//!   "documentation": "# Widgets",
//!   "dependencies": [{
//!     "remote": "example.com",
//!     "owner": "acme",
//!     "repository": "base",
//!     "branch": "main",
//!     "commit": "7c0a1b2"
//!   }]
//! }
//! ```
//!
//! Payloads come from outside the process, so [`ModulePayload::validate`]
//! re-checks every path even though producers are expected to send valid
//! ones.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::ModuleError;
use crate::core::paths::validate_module_file_path;

/// Decoded module payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePayload {
    /// Source files, each with a module-relative path.
    #[serde(default)]
    pub files: Vec<ModuleFilePayload>,

    /// Pinned dependencies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<ModulePinPayload>,

    /// Free-form documentation, empty if none.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub documentation: String,
}

/// One file of a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleFilePayload {
    pub path: String,
    #[serde(with = "base64_content")]
    pub content: Vec<u8>,
}

/// Wire descriptor of a pinned dependency.
///
/// Fields are strings so that a missing field decodes as empty and can be
/// reported as a malformed dependency instead of a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePinPayload {
    #[serde(default)]
    pub remote: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repository: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub branch: String,
    #[serde(default)]
    pub commit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
}

impl ModulePayload {
    /// Decode a payload from JSON.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::InvalidPayload` if the JSON is malformed.
    pub fn from_json(data: &[u8]) -> Result<Self, ModuleError> {
        serde_json::from_slice(data).map_err(|e| ModuleError::InvalidPayload(e.to_string()))
    }

    /// Encode the payload as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::InvalidPayload` if serialization fails.
    pub fn to_json(&self) -> Result<Vec<u8>, ModuleError> {
        serde_json::to_vec_pretty(self).map_err(|e| ModuleError::InvalidPayload(e.to_string()))
    }

    /// Check the payload's own format contract.
    ///
    /// # Errors
    ///
    /// - `ModuleError::InvalidPayload` if there are no files or a path is
    ///   repeated
    /// - `ModuleError::InvalidPath` if a path is not a valid module file path
    pub fn validate(&self) -> Result<(), ModuleError> {
        if self.files.is_empty() {
            return Err(ModuleError::InvalidPayload("module has no files".into()));
        }
        let mut seen = HashSet::with_capacity(self.files.len());
        for file in &self.files {
            validate_module_file_path(&file.path)?;
            if !seen.insert(file.path.as_str()) {
                return Err(ModuleError::InvalidPayload(format!(
                    "duplicate file path '{}'",
                    file.path
                )));
            }
        }
        Ok(())
    }
}

mod base64_content {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, content: &str) -> ModuleFilePayload {
        ModuleFilePayload {
            path: path.into(),
            content: content.as_bytes().to_vec(),
        }
    }

    #[test]
    fn content_is_base64_on_the_wire() {
        let payload = ModulePayload {
            files: vec![file("a.proto", "syntax")],
            ..Default::default()
        };
        let json = String::from_utf8(payload.to_json().unwrap()).unwrap();
        assert!(json.contains("\"c3ludGF4\""));
        assert_eq!(ModulePayload::from_json(json.as_bytes()).unwrap(), payload);
    }

    #[test]
    fn malformed_json_rejected() {
        let err = ModulePayload::from_json(b"{ not json").unwrap_err();
        assert!(matches!(err, ModuleError::InvalidPayload(_)));
    }

    #[test]
    fn bad_base64_rejected() {
        let json = br#"{"files": [{"path": "a.proto", "content": "!!!"}]}"#;
        assert!(ModulePayload::from_json(json).is_err());
    }

    #[test]
    fn empty_payload_rejected() {
        let err = ModulePayload::default().validate().unwrap_err();
        assert!(err.to_string().contains("no files"));
    }

    #[test]
    fn duplicate_paths_rejected() {
        let payload = ModulePayload {
            files: vec![file("a.proto", "1"), file("a.proto", "2")],
            ..Default::default()
        };
        let err = payload.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn invalid_paths_rejected() {
        for path in ["../a.proto", "/a.proto", "a.txt", "./a.proto"] {
            let payload = ModulePayload {
                files: vec![file(path, "1")],
                ..Default::default()
            };
            let err = payload.validate().unwrap_err();
            assert!(matches!(err, ModuleError::InvalidPath(_)), "{path}");
        }
    }
}
