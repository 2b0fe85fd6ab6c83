//! # Env Store Service
//!
//! The main service implementing the envhub store API.
//!
//! ## Architecture
//!
//! This service:
//! 1. Implements `EnvStoreApi` for writes, reads, history and browsing
//! 2. Seals variable values with `TokenCodec` before they reach storage
//! 3. Resolves versions through a pluggable `VersionResolver`
//! 4. Bounds every blob call with the configured operation timeout
//!
//! Nothing is cached between calls. Multiple service instances may share one
//! blob store.

mod api;
mod browse;
mod bundles;
mod changes;
mod helpers;
mod history;
mod resolver;

use std::sync::Arc;

pub use resolver::ScanVersionResolver;

use crate::adapters::SystemTimeSource;
use crate::crypto::{MasterKey, TokenCodec};
use crate::domain::config::StoreConfig;
use crate::ports::outbound::{BlobStore, TimeSource, VersionResolver};

/// The envhub store service.
pub struct EnvStoreService<B, R = ScanVersionResolver<B>, T = SystemTimeSource>
where
    B: BlobStore,
    R: VersionResolver,
    T: TimeSource,
{
    /// Blob substrate holding every bundle.
    pub(crate) blob_store: Arc<B>,
    /// Latest-version computation.
    pub(crate) resolver: R,
    /// Clock for `created_at`.
    pub(crate) time_source: T,
    /// Value encryption.
    pub(crate) codec: TokenCodec,
    pub(crate) config: StoreConfig,
}

/// Dependencies for EnvStoreService
pub struct EnvStoreDependencies<B, R, T> {
    pub blob_store: Arc<B>,
    pub resolver: R,
    pub time_source: T,
}

impl<B: BlobStore> EnvStoreService<B> {
    /// Create a service with scan-based version resolution and the system
    /// clock.
    pub fn new(blob_store: Arc<B>, master_key: &MasterKey, config: StoreConfig) -> Self {
        let deps = EnvStoreDependencies {
            resolver: ScanVersionResolver::new(Arc::clone(&blob_store), &config),
            blob_store,
            time_source: SystemTimeSource,
        };
        Self::with_dependencies(deps, TokenCodec::new(master_key), config)
    }
}

impl<B, R, T> EnvStoreService<B, R, T>
where
    B: BlobStore,
    R: VersionResolver,
    T: TimeSource,
{
    /// Create a service from explicit dependencies.
    pub fn with_dependencies(
        deps: EnvStoreDependencies<B, R, T>,
        codec: TokenCodec,
        config: StoreConfig,
    ) -> Self {
        tracing::debug!(
            "[envhub] Store service ready (list limit {}, timeout {:?}, {:?}, {:?})",
            config.list_limit,
            config.operation_timeout,
            config.write_policy,
            config.decryption_policy
        );

        Self {
            blob_store: deps.blob_store,
            resolver: deps.resolver,
            time_source: deps.time_source,
            codec,
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn blob_store(&self) -> &Arc<B> {
        &self.blob_store
    }
}
