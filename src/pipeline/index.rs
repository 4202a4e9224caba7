// src/pipeline/index.rs

use std::sync::Arc;

use crate::error::Result;
use crate::models::Config;
use crate::services::Indexer;
use crate::storage::{SledStore, connect_cache};

/// Open the configured index store and connect the cache tier if one is set.
///
/// Failing to open the store is fatal; an unreachable cache is not.
pub async fn open_indexer(config: &Config) -> Result<Indexer> {
    let store = SledStore::open(&config.storage.path)?;
    let cache = connect_cache(&config.cache).await;
    if cache.is_none() {
        log::debug!("Running without a cache tier");
    }

    Ok(Indexer::new(Arc::new(store), cache).with_cache_ttl(config.cache.ttl()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Postings;

    #[tokio::test]
    async fn test_open_indexer_without_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.path = dir.path().join("nested").join("index.db");

        let indexer = open_indexer(&config).await.unwrap();
        assert!(!indexer.has_cache());

        let mut postings = Postings::new();
        postings.insert("rust".into(), vec!["https://a.com/".into()]);
        indexer.index(&postings).await.unwrap();
        assert_eq!(indexer.query("rust").await.unwrap(), vec!["https://a.com/"]);
    }

    #[tokio::test]
    async fn test_open_indexer_with_memory_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.path = dir.path().join("index.db");
        config.cache.address = "memory".into();

        let indexer = open_indexer(&config).await.unwrap();
        assert!(indexer.has_cache());
    }

    #[tokio::test]
    async fn test_open_indexer_unusable_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain-file");
        std::fs::write(&file, b"occupied").unwrap();

        let mut config = Config::default();
        config.storage.path = file.join("index.db");

        assert!(open_indexer(&config).await.is_err());
    }
}
