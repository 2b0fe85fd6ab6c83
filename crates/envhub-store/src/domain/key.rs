//! # Bundle Keys and Path Encoding
//!
//! The only place bundle paths are built and version numbers are read back
//! out of filenames.
//!
//! ```text
//! {project}/{service}/{environment}/v{version}.json
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::errors::StoreError;

/// Identifies one configuration line: (project, service, environment).
///
/// Deserializing goes through [`EnvKey::new`], so a decoded key is as valid
/// as a constructed one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawEnvKey")]
pub struct EnvKey {
    project: String,
    service: String,
    environment: String,
}

#[derive(Deserialize)]
struct RawEnvKey {
    project: String,
    service: String,
    environment: String,
}

impl TryFrom<RawEnvKey> for EnvKey {
    type Error = StoreError;

    fn try_from(raw: RawEnvKey) -> Result<Self, Self::Error> {
        EnvKey::new(raw.project, raw.service, raw.environment)
    }
}

impl EnvKey {
    /// Build a key, validating that every component is a usable path segment.
    pub fn new(
        project: impl Into<String>,
        service: impl Into<String>,
        environment: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let key = Self {
            project: project.into(),
            service: service.into(),
            environment: environment.into(),
        };
        validate_segment("project", &key.project)?;
        validate_segment("service", &key.service)?;
        validate_segment("environment", &key.environment)?;
        Ok(key)
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Listing prefix that yields exactly this key's objects.
    pub fn prefix(&self) -> String {
        format!("{}/{}/{}/", self.project, self.service, self.environment)
    }

    /// Deterministic path of one bundle version.
    pub fn bundle_path(&self, version: u64) -> String {
        format!("{}v{}.json", self.prefix(), version)
    }

    /// Version encoded in a listed pathname, if it is one of this key's
    /// bundle files.
    ///
    /// Objects nested deeper than the key prefix, or named anything other
    /// than `v<digits>.json`, are ignored.
    pub fn version_from_path(&self, pathname: &str) -> Option<u64> {
        let filename = pathname.strip_prefix(&self.prefix())?;
        if filename.contains('/') {
            return None;
        }
        parse_version_filename(filename)
    }
}

impl fmt::Display for EnvKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.project, self.service, self.environment)
    }
}

/// Parse `v<digits>.json` into its version number.
pub fn parse_version_filename(filename: &str) -> Option<u64> {
    let digits = filename.strip_prefix('v')?.strip_suffix(".json")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Reject anything that would not survive as a single path segment.
pub(crate) fn validate_segment(field: &str, value: &str) -> Result<(), StoreError> {
    if value.is_empty() {
        return Err(StoreError::Validation(format!("{field} is required")));
    }
    if value.trim() != value {
        return Err(StoreError::Validation(format!(
            "{field} must not have surrounding whitespace"
        )));
    }
    if value.contains('/') {
        return Err(StoreError::Validation(format!(
            "{field} must not contain '/'"
        )));
    }
    if value == "." || value == ".." {
        return Err(StoreError::Validation(format!(
            "{field} must not be '.' or '..'"
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(StoreError::Validation(format!(
            "{field} must not contain control characters"
        )));
    }
    Ok(())
}
