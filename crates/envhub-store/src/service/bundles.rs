//! # Bundle Store Operations
//!
//! Sealing, writing and reading whole bundles.

use super::helpers::with_deadline;
use super::EnvStoreService;
use crate::domain::bundle::{Bundle, SealedBundle, Variables};
use crate::domain::config::{DecryptionPolicy, WritePolicy, DEFAULT_CHANGE_REASON};
use crate::domain::errors::{BlobError, StoreError};
use crate::domain::key::EnvKey;
use crate::ports::outbound::{BlobStore, TimeSource, VersionResolver};

impl<B, R, T> EnvStoreService<B, R, T>
where
    B: BlobStore,
    R: VersionResolver,
    T: TimeSource,
{
    /// Store `variables` as the next version of `key`.
    pub(crate) async fn push_bundle(
        &self,
        key: &EnvKey,
        variables: &Variables,
        author: &str,
        change_reason: &str,
    ) -> Result<u64, StoreError> {
        let sealed_variables = self.seal_variables(variables)?;
        let change_reason = match change_reason.trim() {
            "" => DEFAULT_CHANGE_REASON,
            reason => reason,
        };

        let version = match self.config.write_policy {
            WritePolicy::BestEffort => {
                let version = self.resolver.latest_version(key).await? + 1;
                self.store_bundle(key, version, &sealed_variables, author, change_reason)
                    .await?;
                version
            }
            WritePolicy::Optimistic {
                max_attempts,
                backoff,
            } => {
                self.push_optimistic(
                    key,
                    &sealed_variables,
                    author,
                    change_reason,
                    max_attempts.max(1),
                    backoff,
                )
                .await?
            }
        };

        tracing::info!(
            "[envhub] 📦 Stored {} v{} ({} variables) by {}",
            key,
            version,
            variables.len(),
            author
        );
        Ok(version)
    }

    async fn push_optimistic(
        &self,
        key: &EnvKey,
        sealed_variables: &Variables,
        author: &str,
        change_reason: &str,
        max_attempts: u32,
        backoff: std::time::Duration,
    ) -> Result<u64, StoreError> {
        for attempt in 1..=max_attempts {
            let version = self.resolver.latest_version(key).await? + 1;

            match self
                .store_bundle(key, version, sealed_variables, author, change_reason)
                .await
            {
                Ok(()) => return Ok(version),
                Err(StoreError::VersionConflict { .. }) => {
                    tracing::debug!(
                        "[envhub] {} v{} already exists (attempt {}/{}), re-resolving",
                        key,
                        version,
                        attempt,
                        max_attempts
                    );
                    if attempt < max_attempts {
                        tokio::time::sleep(backoff * attempt).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        tracing::warn!(
            "[envhub] Gave up writing {} after {} attempts",
            key,
            max_attempts
        );
        Err(StoreError::VersionConflict {
            key: key.to_string(),
            attempts: max_attempts,
        })
    }

    /// Create `version` of `key`. A version that already exists is never
    /// replaced; that case is a `VersionConflict`.
    async fn store_bundle(
        &self,
        key: &EnvKey,
        version: u64,
        sealed_variables: &Variables,
        author: &str,
        change_reason: &str,
    ) -> Result<(), StoreError> {
        let document = SealedBundle {
            project: key.project().to_string(),
            service: key.service().to_string(),
            environment: key.environment().to_string(),
            version,
            created_at: self.time_source.now(),
            created_by: author.to_string(),
            change_reason: change_reason.to_string(),
            variables: sealed_variables.clone(),
        };
        let body = document.to_json()?;
        let path = key.bundle_path(version);

        let written = with_deadline(
            self.config.operation_timeout,
            "write bundle",
            self.blob_store.put_new(&path, body),
        )
        .await;

        match written {
            Err(StoreError::StorageUnavailable {
                source: BlobError::AlreadyExists { .. },
                ..
            }) => {
                tracing::warn!(
                    "[envhub] {} v{} already exists; refusing to overwrite",
                    key,
                    version
                );
                Err(StoreError::VersionConflict {
                    key: key.to_string(),
                    attempts: 1,
                })
            }
            other => other,
        }
    }

    fn seal_variables(&self, variables: &Variables) -> Result<Variables, StoreError> {
        variables
            .iter()
            .map(|(name, value)| -> Result<(String, String), StoreError> {
                Ok((name.clone(), self.codec.encrypt(value)?))
            })
            .collect()
    }

    /// Read one version, or the latest when `version` is `None`.
    pub(crate) async fn get_bundle(
        &self,
        key: &EnvKey,
        version: Option<u64>,
    ) -> Result<Bundle, StoreError> {
        let version = match version {
            Some(0) => {
                return Err(StoreError::Validation(
                    "version numbers start at 1".to_string(),
                ))
            }
            Some(version) => version,
            None => match self.resolver.latest_version(key).await? {
                0 => {
                    return Err(StoreError::NotFound {
                        key: key.to_string(),
                        version: None,
                    })
                }
                latest => latest,
            },
        };

        let path = key.bundle_path(version);
        let sealed = self
            .fetch_sealed(&path)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
                version: Some(version),
            })?;

        if !sealed.matches(key, version) {
            return Err(StoreError::CorruptBundle {
                path,
                message: format!(
                    "document is {}/{}/{} v{}",
                    sealed.project, sealed.service, sealed.environment, sealed.version
                ),
            });
        }

        self.open_bundle(sealed)
    }

    /// Fetch and parse the object at `path`. `Ok(None)` when absent.
    pub(crate) async fn fetch_sealed(&self, path: &str) -> Result<Option<SealedBundle>, StoreError> {
        let data = with_deadline(
            self.config.operation_timeout,
            "fetch bundle",
            self.blob_store.get(path),
        )
        .await?;

        data.map(|bytes| SealedBundle::from_json(path, &bytes))
            .transpose()
    }

    /// Decrypt every value according to the configured policy.
    fn open_bundle(&self, sealed: SealedBundle) -> Result<Bundle, StoreError> {
        let mut variables = Variables::new();
        let mut undecryptable = Vec::new();

        for (name, token) in sealed.variables {
            match self.codec.decrypt(&token) {
                Ok(value) => {
                    variables.insert(name, value);
                }
                Err(source) => match self.config.decryption_policy {
                    DecryptionPolicy::Strict => {
                        return Err(StoreError::Decryption { name, source });
                    }
                    DecryptionPolicy::FallbackToRaw => {
                        tracing::error!(
                            "[envhub] Failed to decrypt {} in {}/{}/{} v{}: {}; returning stored token",
                            name,
                            sealed.project,
                            sealed.service,
                            sealed.environment,
                            sealed.version,
                            source
                        );
                        undecryptable.push(name.clone());
                        variables.insert(name, token);
                    }
                },
            }
        }

        Ok(Bundle {
            project: sealed.project,
            service: sealed.service,
            environment: sealed.environment,
            version: sealed.version,
            created_at: sealed.created_at,
            created_by: sealed.created_by,
            change_reason: sealed.change_reason,
            variables,
            undecryptable,
        })
    }
}
