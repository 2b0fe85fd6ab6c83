//! # Change Detection

use super::EnvStoreService;
use crate::domain::bundle::Variables;
use crate::domain::errors::StoreError;
use crate::domain::key::EnvKey;
use crate::domain::requests::ChangeStatus;
use crate::ports::outbound::{BlobStore, TimeSource, VersionResolver};

impl<B, R, T> EnvStoreService<B, R, T>
where
    B: BlobStore,
    R: VersionResolver,
    T: TimeSource,
{
    /// Compare `proposed` with the decrypted latest bundle of `key`.
    ///
    /// Any failure to read the latest bundle yields `Changed`, so an outage
    /// of the read path never blocks a write.
    pub(crate) async fn compare_with_latest(
        &self,
        key: &EnvKey,
        proposed: &Variables,
    ) -> ChangeStatus {
        match self.get_bundle(key, None).await {
            Ok(current) if current.variables == *proposed => ChangeStatus::Unchanged {
                version: current.version,
            },
            Ok(_) | Err(StoreError::NotFound { .. }) => ChangeStatus::Changed,
            Err(e) => {
                tracing::warn!(
                    "[envhub] Could not read latest bundle of {}, treating as changed: {}",
                    key,
                    e
                );
                ChangeStatus::Changed
            }
        }
    }
}
