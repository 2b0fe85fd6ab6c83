use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::errors::BlobError;
use crate::ports::outbound::{BlobEntry, BlobStore};

/// In-memory blob store for unit tests and ephemeral use.
///
/// Ordered map, so prefix listing is a range scan.
#[derive(Default)]
pub struct InMemoryBlobStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, path: &str, body: Vec<u8>) -> Result<(), BlobError> {
        if path.is_empty() {
            return Err(BlobError::InvalidPath {
                path: path.to_string(),
            });
        }
        self.objects.write().insert(path.to_string(), body);
        Ok(())
    }

    async fn put_new(&self, path: &str, body: Vec<u8>) -> Result<(), BlobError> {
        if path.is_empty() {
            return Err(BlobError::InvalidPath {
                path: path.to_string(),
            });
        }
        match self.objects.write().entry(path.to_string()) {
            Entry::Occupied(_) => Err(BlobError::AlreadyExists {
                path: path.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(body);
                Ok(())
            }
        }
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, BlobError> {
        Ok(self.objects.read().get(path).cloned())
    }

    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<BlobEntry>, BlobError> {
        let objects = self.objects.read();
        let entries = objects
            .range(prefix.to_string()..)
            .take_while(|(path, _)| path.starts_with(prefix))
            .take(limit)
            .map(|(path, body)| BlobEntry {
                pathname: path.clone(),
                size: body.len() as u64,
            })
            .collect();
        Ok(entries)
    }
}
