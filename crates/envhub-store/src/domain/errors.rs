//! # Domain Errors
//!
//! Error types for the envhub store.
//!
//! ## Design Principles
//!
//! - `NotFound` and `StorageUnavailable` are never conflated
//! - Errors are descriptive and actionable
//! - No panics in domain logic (use Result instead)

use std::time::Duration;

use thiserror::Error;

use crate::crypto::{DecryptionError, EncryptionError};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Missing or malformed caller input, rejected before storage access.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// No bundle exists for the key, or the requested version is absent.
    #[error("Bundle not found: {key}{}", version_suffix(.version))]
    NotFound { key: String, version: Option<u64> },

    /// A stored token failed authentication under the strict policy.
    #[error("Decryption failed for variable {name}: {source}")]
    Decryption {
        name: String,
        #[source]
        source: DecryptionError,
    },

    /// A value could not be encrypted.
    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    /// The blob substrate failed a list, fetch or write call.
    #[error("Storage unavailable during {operation}: {source}")]
    StorageUnavailable {
        operation: &'static str,
        #[source]
        source: BlobError,
    },

    /// A stored object exists but is not a readable bundle.
    #[error("Corrupt bundle at {path}: {message}")]
    CorruptBundle { path: String, message: String },

    /// A bundle could not be encoded for storage.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Every optimistic write attempt lost the race for its version path.
    #[error("Version conflict on {key}: gave up after {attempts} attempts")]
    VersionConflict { key: String, attempts: u32 },
}

impl StoreError {
    /// Whether retrying the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::StorageUnavailable { .. } | StoreError::VersionConflict { .. }
        )
    }

    pub(crate) fn storage(operation: &'static str, source: BlobError) -> Self {
        StoreError::StorageUnavailable { operation, source }
    }
}

fn version_suffix(version: &Option<u64>) -> String {
    version.map(|v| format!(" (version {v})")).unwrap_or_default()
}

/// Blob substrate errors.
#[derive(Debug, Clone, Error)]
pub enum BlobError {
    /// I/O error during read/write/list.
    #[error("Blob I/O error: {message}")]
    Io { message: String },

    /// The path cannot be addressed by this substrate.
    #[error("Invalid blob path: {path}")]
    InvalidPath { path: String },

    /// The call exceeded its deadline.
    #[error("Blob call timed out after {after:?}")]
    Timeout { after: Duration },

    /// The substrate refused or could not be reached.
    #[error("Blob store unavailable: {message}")]
    Unavailable { message: String },

    /// A create-only write found an object already at the path.
    #[error("Blob already exists: {path}")]
    AlreadyExists { path: String },
}

impl From<std::io::Error> for BlobError {
    fn from(err: std::io::Error) -> Self {
        BlobError::Io {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display_includes_version() {
        let err = StoreError::NotFound {
            key: "proj/svc/dev".to_string(),
            version: Some(3),
        };
        assert_eq!(err.to_string(), "Bundle not found: proj/svc/dev (version 3)");

        let err = StoreError::NotFound {
            key: "proj/svc/dev".to_string(),
            version: None,
        };
        assert_eq!(err.to_string(), "Bundle not found: proj/svc/dev");
    }

    #[test]
    fn test_retryable_classification() {
        let unavailable = StoreError::storage(
            "list",
            BlobError::Unavailable {
                message: "503".to_string(),
            },
        );
        assert!(unavailable.is_retryable());
        assert!(!StoreError::Validation("missing project".to_string()).is_retryable());
        assert!(!StoreError::NotFound {
            key: "a/b/c".to_string(),
            version: None
        }
        .is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let blob: BlobError = io.into();
        assert!(matches!(blob, BlobError::Io { message } if message.contains("denied")));
    }
}
