//! # Scan-Based Version Resolution
//!
//! The latest version is never stored; it is recomputed by listing the key's
//! prefix and taking the highest `v<N>.json`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::helpers::with_deadline;
use crate::domain::config::StoreConfig;
use crate::domain::errors::StoreError;
use crate::domain::key::EnvKey;
use crate::ports::outbound::{BlobStore, VersionResolver};

/// Resolves versions by scanning bundle paths.
///
/// Listing is capped at `list_limit`; a key with more bundles than that will
/// be undercounted.
pub struct ScanVersionResolver<B: BlobStore> {
    blob_store: Arc<B>,
    list_limit: usize,
    timeout: Duration,
}

impl<B: BlobStore> ScanVersionResolver<B> {
    pub fn new(blob_store: Arc<B>, config: &StoreConfig) -> Self {
        Self {
            blob_store,
            list_limit: config.list_limit,
            timeout: config.operation_timeout,
        }
    }
}

#[async_trait]
impl<B: BlobStore> VersionResolver for ScanVersionResolver<B> {
    async fn latest_version(&self, key: &EnvKey) -> Result<u64, StoreError> {
        let entries = with_deadline(
            self.timeout,
            "list versions",
            self.blob_store.list(&key.prefix(), self.list_limit),
        )
        .await?;

        if entries.len() >= self.list_limit {
            tracing::warn!(
                "[envhub] Listing for {} hit the cap of {} objects; latest version may be undercounted",
                key,
                self.list_limit
            );
        }

        let latest = entries
            .iter()
            .filter_map(|entry| key.version_from_path(&entry.pathname))
            .max()
            .unwrap_or(0);

        tracing::debug!("[envhub] Latest version of {} is {}", key, latest);
        Ok(latest)
    }
}
