//! Embedded on-disk index store backed by sled.
//!
//! All postings live in one tree (`IndexBucket`), keyed by word, with the
//! compressed URL list as value.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::storage::IndexStore;

/// Name of the tree holding every index entry.
pub const INDEX_BUCKET: &str = "IndexBucket";

/// sled-backed [`IndexStore`].
///
/// sled calls block, so every operation runs on the blocking thread pool.
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = sled::open(path)?;
        log::info!("Opened index store at {}", path.display());
        Ok(Self { db })
    }

    /// In-memory store removed on drop.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&sled::Db) -> Result<T> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || op(&db)).await?
    }
}

/// The bucket, if it has been created by a write.
fn bucket(db: &sled::Db) -> Result<Option<sled::Tree>> {
    let exists = db
        .tree_names()
        .iter()
        .any(|name| &name[..] == INDEX_BUCKET.as_bytes());
    if !exists {
        return Ok(None);
    }
    Ok(Some(db.open_tree(INDEX_BUCKET)?))
}

#[async_trait]
impl IndexStore for SledStore {
    async fn write_batch(&self, entries: Vec<(String, Vec<u8>)>) -> Result<usize> {
        self.blocking(move |db| {
            let tree = db.open_tree(INDEX_BUCKET)?;
            let count = entries.len();

            let mut batch = sled::Batch::default();
            for (word, payload) in entries {
                batch.insert(word.as_bytes(), payload);
            }
            tree.apply_batch(batch)?;
            tree.flush()?;

            Ok(count)
        })
        .await
    }

    async fn read(&self, word: &str) -> Result<Option<Vec<u8>>> {
        let word = word.to_string();
        self.blocking(move |db| {
            let Some(tree) = bucket(db)? else {
                return Ok(None);
            };
            Ok(tree.get(word.as_bytes())?.map(|value| value.to_vec()))
        })
        .await
    }

    async fn len(&self) -> Result<usize> {
        self.blocking(|db| Ok(bucket(db)?.map_or(0, |tree| tree.len())))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_bucket_reads_empty() {
        let store = SledStore::temporary().unwrap();
        assert_eq!(store.read("anything").await.unwrap(), None);
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_batch_write_and_read() {
        let store = SledStore::temporary().unwrap();
        let written = store
            .write_batch(vec![
                ("rust".to_string(), vec![1, 2, 3]),
                ("go".to_string(), vec![4]),
            ])
            .await
            .unwrap();

        assert_eq!(written, 2);
        assert_eq!(store.read("rust").await.unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(store.read("go").await.unwrap(), Some(vec![4]));
        assert_eq!(store.read("zig").await.unwrap(), None);
        assert_eq!(store.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_write_replaces_previous_value() {
        let store = SledStore::temporary().unwrap();
        store
            .write_batch(vec![("rust".to_string(), vec![1])])
            .await
            .unwrap();
        store
            .write_batch(vec![("rust".to_string(), vec![2])])
            .await
            .unwrap();

        assert_eq!(store.read("rust").await.unwrap(), Some(vec![2]));
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.db");
        {
            let store = SledStore::open(&path).unwrap();
            store
                .write_batch(vec![("rust".to_string(), vec![7])])
                .await
                .unwrap();
        }

        let store = SledStore::open(&path).unwrap();
        assert_eq!(store.read("rust").await.unwrap(), Some(vec![7]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_batches_and_reads() {
        let store = SledStore::temporary().unwrap();

        let writes = (0..8).map(|i| {
            let store = store.clone();
            async move {
                store
                    .write_batch(vec![(format!("word{i}"), vec![i as u8])])
                    .await
            }
        });
        for written in futures::future::join_all(writes).await {
            assert_eq!(written.unwrap(), 1);
        }

        let reads = (0..8).map(|i| {
            let store = store.clone();
            async move { store.read(&format!("word{i}")).await }
        });
        for (i, read) in futures::future::join_all(reads).await.into_iter().enumerate() {
            assert_eq!(read.unwrap(), Some(vec![i as u8]));
        }
        assert_eq!(store.len().await.unwrap(), 8);
    }

    #[test]
    fn test_open_invalid_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain-file");
        std::fs::write(&file, b"occupied").unwrap();

        assert!(SledStore::open(file.join("index.db")).is_err());
    }
}
