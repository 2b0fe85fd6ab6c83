//! # envhub Store
//!
//! Versioned, encrypted environment-variable bundles kept in a flat,
//! prefix-listable blob store.
//!
//! ## Storage Layout
//!
//! Every write produces a new immutable object. There are no indexes,
//! counters or locks; the latest version is recomputed from a listing.
//!
//! ```text
//! {project}/{service}/{environment}/v1.json
//! {project}/{service}/{environment}/v2.json
//! ...
//! ```
//!
//! Variable names are stored in the clear. Every value is an authenticated
//! token produced by `TokenCodec`.
//!
//! ## Guarantees
//!
//! | Property | Description |
//! |----------|-------------|
//! | Immutability | A stored version is never rewritten by this crate |
//! | Monotonic versions | A new version is `latest + 1`; gaps are tolerated |
//! | Idempotent writes | Re-submitting the latest variables creates nothing |
//! | Sealed values | Plaintext values never reach the blob store |
//! | Honest failures | Storage outages surface as `StorageUnavailable`, not `NotFound` |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Keys, bundles, namespace rules, configuration, errors
//! - `crypto/` - Master key handling and the value token codec
//! - `ports/` - Port traits (inbound API, outbound SPI)
//! - `adapters/` - Blob stores and the system clock
//! - `service/` - Application service implementing the API
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use envhub_store::{EnvKey, EnvStoreApi, EnvStoreService, InMemoryBlobStore, MasterKey, StoreConfig};
//!
//! let store = Arc::new(InMemoryBlobStore::new());
//! let service = EnvStoreService::new(store, &MasterKey::generate(), StoreConfig::default());
//!
//! let key = EnvKey::new("shop", "api", "prod")?;
//! let version = service.push(&key, &variables, "alice", "rotate db password").await?;
//! let bundle = service.get(&key, None).await?;
//! ```

pub mod adapters;
pub mod crypto;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(test)]
mod test_utils;

// Re-export key types for convenience
pub use adapters::{InMemoryBlobStore, SystemTimeSource};
#[cfg(feature = "fs")]
pub use adapters::FileSystemBlobStore;
pub use crypto::{DecryptionError, EncryptionError, KeyError, MasterKey, TokenCodec};
pub use domain::bundle::{canonical_variable_name, Bundle, HistoryEntry, SealedBundle, Variables};
pub use domain::config::{DecryptionPolicy, StoreConfig, WritePolicy};
pub use domain::dotenv::{parse_dotenv, parse_dotenv_canonical, render_dotenv};
pub use domain::errors::{BlobError, StoreError};
pub use domain::key::EnvKey;
pub use domain::namespace::BrowseScope;
pub use domain::requests::{ChangeStatus, WriteOutcome, WriteRequest};
pub use ports::inbound::EnvStoreApi;
pub use ports::outbound::{BlobEntry, BlobStore, TimeSource, VersionResolver};
pub use service::{EnvStoreDependencies, EnvStoreService, ScanVersionResolver};
