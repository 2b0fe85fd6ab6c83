//! # Requests and Outcomes
//!
//! Boundary types for writes. Validation happens here, before any storage
//! access.

use serde::{Deserialize, Serialize};

use crate::domain::bundle::Variables;
use crate::domain::config::DEFAULT_CHANGE_REASON;
use crate::domain::errors::StoreError;
use crate::domain::key::EnvKey;

/// A caller's request to store a new set of variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteRequest {
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub variables: Option<Variables>,
    #[serde(default)]
    pub change_reason: Option<String>,
}

impl WriteRequest {
    pub fn new(key: &EnvKey, variables: Variables, change_reason: impl Into<String>) -> Self {
        Self {
            project: key.project().to_string(),
            service: key.service().to_string(),
            environment: key.environment().to_string(),
            variables: Some(variables),
            change_reason: Some(change_reason.into()),
        }
    }

    /// Check required fields and fill the default change reason.
    pub fn validate(self) -> Result<ValidatedWrite, StoreError> {
        let key = EnvKey::new(self.project, self.service, self.environment)?;
        let variables = self
            .variables
            .ok_or_else(|| StoreError::Validation("variables is required".to_string()))?;

        let change_reason = self
            .change_reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_CHANGE_REASON.to_string());

        Ok(ValidatedWrite {
            key,
            variables,
            change_reason,
        })
    }
}

/// A write request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedWrite {
    pub key: EnvKey,
    pub variables: Variables,
    pub change_reason: String,
}

/// Result of a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOutcome {
    /// The new version, or the unchanged current one.
    pub version: u64,
    /// `false` when the proposal matched the latest bundle and nothing was
    /// written.
    pub created: bool,
}

/// Change detector verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    /// Latest bundle already holds exactly these variables.
    Unchanged { version: u64 },
    /// A new version is warranted.
    Changed,
}
