//! # Bundles
//!
//! Immutable, versioned snapshots of one key's variables.
//!
//! `SealedBundle` is the persisted form (values are ciphertext tokens);
//! `Bundle` is what callers receive after decryption.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::StoreError;
use crate::domain::key::EnvKey;

/// Variable name to value. Ordered, so equality ignores insertion order.
pub type Variables = BTreeMap<String, String>;

/// Persisted bundle document.
///
/// Field names and layout are the on-disk JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedBundle {
    pub project: String,
    pub service: String,
    pub environment: String,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub change_reason: String,
    /// Variable name to encrypted token. Never plaintext.
    pub variables: Variables,
}

impl SealedBundle {
    /// Encode for storage.
    pub fn to_json(&self) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec_pretty(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Decode an object fetched from `path`.
    pub fn from_json(path: &str, data: &[u8]) -> Result<Self, StoreError> {
        serde_json::from_slice(data).map_err(|e| StoreError::CorruptBundle {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Whether this document belongs at `key`'s `version` path.
    pub fn matches(&self, key: &EnvKey, version: u64) -> bool {
        self.version == version
            && self.project == key.project()
            && self.service == key.service()
            && self.environment == key.environment()
    }

    /// Metadata only, as reported by history.
    pub fn history_entry(&self) -> HistoryEntry {
        HistoryEntry {
            version: self.version,
            created_at: self.created_at,
            created_by: self.created_by.clone(),
            change_reason: self.change_reason.clone(),
        }
    }
}

/// A bundle with decrypted variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub project: String,
    pub service: String,
    pub environment: String,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub change_reason: String,
    pub variables: Variables,
    /// Names whose token failed to decrypt and whose value is therefore the
    /// raw stored token.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub undecryptable: Vec<String>,
}

impl Bundle {
    /// True when every value decrypted cleanly.
    pub fn is_fully_decrypted(&self) -> bool {
        self.undecryptable.is_empty()
    }
}

/// One row of a key's version history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub change_reason: String,
}

/// Canonical form for a variable name: upper-case, `A-Z0-9_` only.
///
/// The store itself matches names exactly; callers that accept free-form
/// input canonicalize before writing.
pub fn canonical_variable_name(raw: &str) -> String {
    raw.trim()
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sealed() -> SealedBundle {
        SealedBundle {
            project: "proj1".to_string(),
            service: "svcA".to_string(),
            environment: "dev".to_string(),
            version: 2,
            created_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            created_by: "alice".to_string(),
            change_reason: "rotate".to_string(),
            variables: Variables::from([("API_KEY".to_string(), "gAAAA-token".to_string())]),
        }
    }

    #[test]
    fn test_json_format_fields() {
        let json: serde_json::Value = serde_json::from_slice(&sealed().to_json().unwrap()).unwrap();

        assert_eq!(json["project"], "proj1");
        assert_eq!(json["service"], "svcA");
        assert_eq!(json["environment"], "dev");
        assert_eq!(json["version"], 2);
        assert_eq!(json["created_at"], "2025-01-02T03:04:05Z");
        assert_eq!(json["created_by"], "alice");
        assert_eq!(json["change_reason"], "rotate");
        assert_eq!(json["variables"]["API_KEY"], "gAAAA-token");
    }

    #[test]
    fn test_corrupt_json_reports_path() {
        let err = SealedBundle::from_json("p/s/e/v1.json", b"{not json").unwrap_err();
        assert!(matches!(err, StoreError::CorruptBundle { path, .. } if path == "p/s/e/v1.json"));
    }

    #[test]
    fn test_matches_key_and_version() {
        let bundle = sealed();
        let key = EnvKey::new("proj1", "svcA", "dev").unwrap();
        assert!(bundle.matches(&key, 2));
        assert!(!bundle.matches(&key, 3));
        assert!(!bundle.matches(&EnvKey::new("proj1", "svcA", "prod").unwrap(), 2));
    }

    #[test]
    fn test_canonical_variable_name() {
        assert_eq!(canonical_variable_name("database_url"), "DATABASE_URL");
        assert_eq!(canonical_variable_name(" api-key.v2 "), "APIKEYV2");
        assert_eq!(canonical_variable_name("ümlaut_1"), "MLAUT_1");
    }

    #[test]
    fn test_undecryptable_omitted_when_empty() {
        let bundle = Bundle {
            project: "p".to_string(),
            service: "s".to_string(),
            environment: "e".to_string(),
            version: 1,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            created_by: "bob".to_string(),
            change_reason: "init".to_string(),
            variables: Variables::new(),
            undecryptable: Vec::new(),
        };
        let json = serde_json::to_value(&bundle).unwrap();
        assert!(json.get("undecryptable").is_none());
        assert!(bundle.is_fully_decrypted());
    }
}
