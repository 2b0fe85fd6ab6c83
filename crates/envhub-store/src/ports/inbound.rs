//! # Inbound Ports (Driving Ports)
//!
//! The primary API of the envhub store.

use async_trait::async_trait;

use crate::domain::bundle::{Bundle, HistoryEntry, Variables};
use crate::domain::errors::StoreError;
use crate::domain::key::EnvKey;
use crate::domain::namespace::BrowseScope;
use crate::domain::requests::{ChangeStatus, WriteOutcome, WriteRequest};

/// Primary API for the envhub store.
///
/// Every operation is an independent unit of work and re-reads the blob
/// store; nothing is cached between calls.
#[async_trait]
pub trait EnvStoreApi: Send + Sync {
    /// Validate a write, skip it if nothing changed, otherwise push a new
    /// version.
    ///
    /// ## Errors
    ///
    /// - `Validation`: missing project/service/environment/variables
    /// - `StorageUnavailable`: the write itself failed
    /// - `VersionConflict`: the next version was already taken (and, under the
    ///   optimistic policy, every retry was too)
    async fn write(&self, request: WriteRequest, author: &str)
        -> Result<WriteOutcome, StoreError>;

    /// Unconditionally store `variables` as the next version of `key`.
    ///
    /// Returns the new version number. An existing version is never
    /// replaced: if the resolved version is already taken the push fails
    /// with `VersionConflict`.
    async fn push(
        &self,
        key: &EnvKey,
        variables: &Variables,
        author: &str,
        change_reason: &str,
    ) -> Result<u64, StoreError>;

    /// Read a bundle, decrypted. `version = None` reads the latest.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: no versions exist, or the requested version is absent
    /// - `StorageUnavailable`: listing or fetch failed
    /// - `CorruptBundle`: the stored object is not a bundle
    /// - `Decryption`: only under `DecryptionPolicy::Strict`
    async fn get(&self, key: &EnvKey, version: Option<u64>) -> Result<Bundle, StoreError>;

    /// Highest stored version of `key`, 0 if none.
    async fn latest_version(&self, key: &EnvKey) -> Result<u64, StoreError>;

    /// Version metadata, most recent first. Unreadable objects are skipped.
    async fn list_history(&self, key: &EnvKey) -> Result<Vec<HistoryEntry>, StoreError>;

    /// Sorted, deduplicated child names below `scope`.
    async fn children(&self, scope: &BrowseScope) -> Result<Vec<String>, StoreError>;

    /// Compare a proposal with the latest bundle. Never fails: a failed
    /// lookup is reported as `Changed`.
    async fn detect_change(&self, key: &EnvKey, proposed: &Variables) -> ChangeStatus;
}
