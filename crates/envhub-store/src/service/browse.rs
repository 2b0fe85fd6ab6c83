//! # Namespace Browser

use super::helpers::with_deadline;
use super::EnvStoreService;
use crate::domain::errors::StoreError;
use crate::domain::namespace::BrowseScope;
use crate::ports::outbound::{BlobStore, TimeSource, VersionResolver};

impl<B, R, T> EnvStoreService<B, R, T>
where
    B: BlobStore,
    R: VersionResolver,
    T: TimeSource,
{
    pub(crate) async fn list_children(&self, scope: &BrowseScope) -> Result<Vec<String>, StoreError> {
        let entries = with_deadline(
            self.config.operation_timeout,
            "browse",
            self.blob_store.list(&scope.prefix(), self.config.list_limit),
        )
        .await?;

        Ok(scope.children(entries.iter().map(|entry| entry.pathname.as_str())))
    }
}
