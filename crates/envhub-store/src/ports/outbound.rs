//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the envhub store service.
//!
//! The blob substrate offers only write, fetch and prefix listing. There are
//! no directories, counters or transactions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::errors::{BlobError, StoreError};
use crate::domain::key::EnvKey;

/// One listed object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobEntry {
    /// Full path of the object, `/`-separated.
    pub pathname: String,
    /// Object size in bytes.
    pub size: u64,
}

/// Abstract interface for the flat blob substrate.
///
/// Production: any object store with prefix listing.
/// Testing: `InMemoryBlobStore`, `FileSystemBlobStore`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `body` at `path` in a single call, replacing any existing object.
    async fn put(&self, path: &str, body: Vec<u8>) -> Result<(), BlobError>;

    /// Store `body` at `path` only if nothing is there yet.
    ///
    /// Fails with `BlobError::AlreadyExists` when the path is taken. The check
    /// and the write are a single step, so two writers never both succeed.
    async fn put_new(&self, path: &str, body: Vec<u8>) -> Result<(), BlobError>;

    /// Fetch an object. `Ok(None)` when nothing is stored at `path`.
    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, BlobError>;

    /// List objects whose path starts with `prefix`, in lexicographic order,
    /// returning at most `limit` entries.
    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<BlobEntry>, BlobError>;

    /// Whether an object exists at exactly `path`.
    async fn exists(&self, path: &str) -> Result<bool, BlobError> {
        let entries = self.list(path, 1).await?;
        Ok(entries.first().is_some_and(|e| e.pathname == path))
    }
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}

/// Computes the latest stored version of a key.
///
/// The default implementation scans bundle paths. A deployment with an atomic
/// counter or sequence service can provide its own implementation without
/// touching callers.
#[async_trait]
pub trait VersionResolver: Send + Sync {
    /// Highest version currently stored for `key`, or 0 if none.
    async fn latest_version(&self, key: &EnvKey) -> Result<u64, StoreError>;
}
