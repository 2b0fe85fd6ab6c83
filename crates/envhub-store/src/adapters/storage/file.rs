use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::domain::errors::BlobError;
use crate::ports::outbound::{BlobEntry, BlobStore};

/// Directory under the root used for in-flight writes. Never listed.
const STAGING_DIR: &str = ".staging";

/// Local-directory blob store.
///
/// Each object path maps to a file below `root`. Writes go to a staging file
/// first and are renamed into place, so readers never observe a partially
/// written object.
pub struct FileSystemBlobStore {
    root: PathBuf,
}

impl FileSystemBlobStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        if root.exists() {
            tracing::info!("[envhub] 💾 Using blob directory {}", root.display());
        } else {
            tracing::info!(
                "[envhub] 📁 Blob directory {} will be created on first write",
                root.display()
            );
        }
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an object path onto the filesystem, rejecting anything that could
    /// escape the root or collide with staging.
    fn resolve(&self, path: &str) -> Result<PathBuf, BlobError> {
        let invalid = || BlobError::InvalidPath {
            path: path.to_string(),
        };

        let mut resolved = self.root.clone();
        for (i, segment) in path.split('/').enumerate() {
            if segment.is_empty()
                || segment == "."
                || segment == ".."
                || segment.contains('\\')
                || (i == 0 && segment == STAGING_DIR)
            {
                return Err(invalid());
            }
            resolved.push(segment);
        }
        Ok(resolved)
    }

    /// Write `body` to a fresh staging file, creating `target`'s parent
    /// directory on the way.
    async fn stage(&self, target: &Path, body: &[u8]) -> Result<PathBuf, BlobError> {
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let staging = self.root.join(STAGING_DIR);
        tokio::fs::create_dir_all(&staging).await?;
        let temp_path = staging.join(format!("{}.tmp", uuid::Uuid::new_v4()));

        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(body).await?;
        file.sync_all().await?;
        Ok(temp_path)
    }

    /// Directory to start walking from for `prefix`, plus the relative path
    /// of that directory.
    fn walk_start(&self, prefix: &str) -> Option<(PathBuf, String)> {
        match prefix.rfind('/') {
            None => Some((self.root.clone(), String::new())),
            Some(idx) => {
                let dir = &prefix[..idx];
                let resolved = self.resolve(dir).ok()?;
                Some((resolved, format!("{dir}/")))
            }
        }
    }
}

#[async_trait]
impl BlobStore for FileSystemBlobStore {
    async fn put(&self, path: &str, body: Vec<u8>) -> Result<(), BlobError> {
        let target = self.resolve(path)?;
        let temp_path = self.stage(&target, &body).await?;

        if let Err(e) = tokio::fs::rename(&temp_path, &target).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn put_new(&self, path: &str, body: Vec<u8>) -> Result<(), BlobError> {
        let target = self.resolve(path)?;
        let temp_path = self.stage(&target, &body).await?;

        // Linking fails if the target exists, unlike rename.
        let linked = tokio::fs::hard_link(&temp_path, &target).await;
        let _ = tokio::fs::remove_file(&temp_path).await;
        match linked {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(BlobError::AlreadyExists {
                    path: path.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, BlobError> {
        let target = self.resolve(path)?;
        match tokio::fs::read(&target).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<BlobEntry>, BlobError> {
        let Some((start, start_rel)) = self.walk_start(prefix) else {
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        let mut pending = vec![(start, start_rel)];

        while let Some((dir, rel)) = pending.pop() {
            let mut read_dir = match tokio::fs::read_dir(&dir).await {
                Ok(rd) => rd,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            while let Some(entry) = read_dir.next_entry().await? {
                let Ok(name) = entry.file_name().into_string() else {
                    continue;
                };
                if rel.is_empty() && name == STAGING_DIR {
                    continue;
                }

                let pathname = format!("{rel}{name}");
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    let dir_rel = format!("{pathname}/");
                    if dir_rel.starts_with(prefix) || prefix.starts_with(&dir_rel) {
                        pending.push((entry.path(), dir_rel));
                    }
                } else if file_type.is_file() && pathname.starts_with(prefix) {
                    let size = entry.metadata().await?.len();
                    entries.push(BlobEntry { pathname, size });
                }
            }
        }

        entries.sort_by(|a, b| a.pathname.cmp(&b.pathname));
        entries.truncate(limit);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemBlobStore::new(dir.path());

        store
            .put("proj/svc/dev/v1.json", b"{}".to_vec())
            .await
            .unwrap();

        assert_eq!(
            store.get("proj/svc/dev/v1.json").await.unwrap(),
            Some(b"{}".to_vec())
        );
        assert_eq!(store.get("proj/svc/dev/v2.json").await.unwrap(), None);
        assert!(dir.path().join("proj/svc/dev/v1.json").is_file());
    }

    #[tokio::test]
    async fn test_list_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemBlobStore::new(dir.path());

        for path in [
            "proj1/svcA/dev/v1.json",
            "proj1/svcA/dev/v2.json",
            "proj1/svcA/devx/v1.json",
            "proj1/svcB/prod-v1.json",
            "proj2/svcC/qa/v1.json",
        ] {
            store.put(path, b"x".to_vec()).await.unwrap();
        }

        let names = |entries: Vec<BlobEntry>| -> Vec<String> {
            entries.into_iter().map(|e| e.pathname).collect()
        };

        assert_eq!(
            names(store.list("proj1/svcA/dev/", 100).await.unwrap()),
            vec!["proj1/svcA/dev/v1.json", "proj1/svcA/dev/v2.json"]
        );
        assert_eq!(
            names(store.list("proj1/svcA/dev", 100).await.unwrap()),
            vec![
                "proj1/svcA/dev/v1.json",
                "proj1/svcA/dev/v2.json",
                "proj1/svcA/devx/v1.json"
            ]
        );
        assert_eq!(store.list("", 100).await.unwrap().len(), 5);
        assert_eq!(store.list("", 2).await.unwrap().len(), 2);
        assert!(store.list("nope/", 100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_staging_never_listed() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemBlobStore::new(dir.path());
        store.put("p/s/e/v1.json", b"x".to_vec()).await.unwrap();

        std::fs::write(dir.path().join(STAGING_DIR).join("leftover.tmp"), b"partial").unwrap();

        let listed = store.list("", 100).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].pathname, "p/s/e/v1.json");
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemBlobStore::new(dir.path());

        for bad in ["../evil", "a//b", "", ".staging/x", "a/./b"] {
            assert!(
                matches!(
                    store.put(bad, vec![]).await,
                    Err(BlobError::InvalidPath { .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_put_new_never_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemBlobStore::new(dir.path());

        store.put_new("p/s/e/v1.json", b"first".to_vec()).await.unwrap();
        let second = store.put_new("p/s/e/v1.json", b"second".to_vec()).await;

        assert!(matches!(second, Err(BlobError::AlreadyExists { .. })));
        assert_eq!(
            store.get("p/s/e/v1.json").await.unwrap(),
            Some(b"first".to_vec())
        );
        let staged = std::fs::read_dir(dir.path().join(STAGING_DIR)).unwrap().count();
        assert_eq!(staged, 0);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_whole_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSystemBlobStore::new(dir.path());

        store.put("a/b", b"long original".to_vec()).await.unwrap();
        store.put("a/b", b"new".to_vec()).await.unwrap();

        assert_eq!(store.get("a/b").await.unwrap(), Some(b"new".to_vec()));
    }
}
