//! # History Reader

use futures::{stream, StreamExt};

use super::helpers::with_deadline;
use super::EnvStoreService;
use crate::domain::bundle::HistoryEntry;
use crate::domain::errors::StoreError;
use crate::domain::key::EnvKey;
use crate::ports::outbound::{BlobStore, TimeSource, VersionResolver};

impl<B, R, T> EnvStoreService<B, R, T>
where
    B: BlobStore,
    R: VersionResolver,
    T: TimeSource,
{
    /// Metadata for every readable version of `key`, newest first.
    ///
    /// A failed listing is an error. Individual objects that cannot be
    /// fetched or parsed, or whose content disagrees with their path, are
    /// logged and left out.
    pub(crate) async fn read_history(&self, key: &EnvKey) -> Result<Vec<HistoryEntry>, StoreError> {
        let entries = with_deadline(
            self.config.operation_timeout,
            "list history",
            self.blob_store.list(&key.prefix(), self.config.list_limit),
        )
        .await?;

        let versions: Vec<u64> = entries
            .iter()
            .filter_map(|entry| key.version_from_path(&entry.pathname))
            .collect();

        let mut history: Vec<HistoryEntry> = stream::iter(versions)
            .map(|version| async move {
                let path = key.bundle_path(version);
                let fetched = self.fetch_sealed(&path).await;
                (path, version, fetched)
            })
            .buffer_unordered(self.config.history_concurrency)
            .filter_map(|(path, version, fetched)| async move {
                match fetched {
                    Ok(Some(sealed)) if sealed.matches(key, version) => Some(sealed.history_entry()),
                    Ok(Some(_)) => {
                        tracing::warn!("[envhub] Skipping {}: content does not match path", path);
                        None
                    }
                    Ok(None) => {
                        tracing::warn!("[envhub] Skipping {}: listed but no longer present", path);
                        None
                    }
                    Err(e) => {
                        tracing::warn!("[envhub] Skipping {}: {}", path, e);
                        None
                    }
                }
            })
            .collect()
            .await;

        history.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(history)
    }
}
