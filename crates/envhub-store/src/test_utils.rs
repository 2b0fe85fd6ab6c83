//! Shared fixtures for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use crate::adapters::InMemoryBlobStore;
use crate::domain::bundle::Variables;
use crate::domain::errors::BlobError;
use crate::domain::key::EnvKey;
use crate::ports::outbound::{BlobEntry, BlobStore, TimeSource};

pub fn test_key() -> EnvKey {
    EnvKey::new("proj1", "svcA", "dev").unwrap()
}

pub fn vars(pairs: &[(&str, &str)]) -> Variables {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

/// Clock that always reads the same instant.
pub struct FixedTimeSource(pub DateTime<Utc>);

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn unavailable() -> BlobError {
    BlobError::Unavailable {
        message: "injected failure".to_string(),
    }
}

/// In-memory store with switchable faults.
///
/// - `fail_list` / `fail_get` / `fail_put`: every such call errors
/// - `stale_lists`: the next N listings come back empty, as from a lagging
///   replica
/// - `list_delay`: every listing sleeps first
#[derive(Default)]
pub struct FaultyBlobStore {
    pub inner: InMemoryBlobStore,
    pub fail_list: AtomicBool,
    pub fail_get: AtomicBool,
    pub fail_put: AtomicBool,
    pub stale_lists: AtomicUsize,
    pub list_delay: Mutex<Option<Duration>>,
    pub calls: AtomicUsize,
}

impl FaultyBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for FaultyBlobStore {
    async fn put(&self, path: &str, body: Vec<u8>) -> Result<(), BlobError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.put(path, body).await
    }

    async fn put_new(&self, path: &str, body: Vec<u8>) -> Result<(), BlobError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.put_new(path, body).await
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, BlobError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.get(path).await
    }

    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<BlobEntry>, BlobError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.list_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let stale = self
            .stale_lists
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if stale {
            return Ok(Vec::new());
        }
        self.inner.list(prefix, limit).await
    }

    async fn exists(&self, path: &str) -> Result<bool, BlobError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.inner.get(path).await?.is_some())
    }
}
