//! # EnvStoreApi Implementation

use async_trait::async_trait;

use super::EnvStoreService;
use crate::domain::bundle::{Bundle, HistoryEntry, Variables};
use crate::domain::errors::StoreError;
use crate::domain::key::EnvKey;
use crate::domain::namespace::BrowseScope;
use crate::domain::requests::{ChangeStatus, ValidatedWrite, WriteOutcome, WriteRequest};
use crate::ports::inbound::EnvStoreApi;
use crate::ports::outbound::{BlobStore, TimeSource, VersionResolver};

#[async_trait]
impl<B, R, T> EnvStoreApi for EnvStoreService<B, R, T>
where
    B: BlobStore,
    R: VersionResolver,
    T: TimeSource,
{
    async fn write(
        &self,
        request: WriteRequest,
        author: &str,
    ) -> Result<WriteOutcome, StoreError> {
        let ValidatedWrite {
            key,
            variables,
            change_reason,
        } = request.validate()?;

        if let ChangeStatus::Unchanged { version } =
            self.compare_with_latest(&key, &variables).await
        {
            tracing::info!("[envhub] No changes for {}, staying at v{}", key, version);
            return Ok(WriteOutcome {
                version,
                created: false,
            });
        }

        let version = self
            .push_bundle(&key, &variables, author, &change_reason)
            .await?;
        Ok(WriteOutcome {
            version,
            created: true,
        })
    }

    async fn push(
        &self,
        key: &EnvKey,
        variables: &Variables,
        author: &str,
        change_reason: &str,
    ) -> Result<u64, StoreError> {
        self.push_bundle(key, variables, author, change_reason).await
    }

    async fn get(&self, key: &EnvKey, version: Option<u64>) -> Result<Bundle, StoreError> {
        self.get_bundle(key, version).await
    }

    async fn latest_version(&self, key: &EnvKey) -> Result<u64, StoreError> {
        self.resolver.latest_version(key).await
    }

    async fn list_history(&self, key: &EnvKey) -> Result<Vec<HistoryEntry>, StoreError> {
        self.read_history(key).await
    }

    async fn children(&self, scope: &BrowseScope) -> Result<Vec<String>, StoreError> {
        self.list_children(scope).await
    }

    async fn detect_change(&self, key: &EnvKey, proposed: &Variables) -> ChangeStatus {
        self.compare_with_latest(key, proposed).await
    }
}
