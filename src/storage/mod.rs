//! Storage abstractions for the inverted index.
//!
//! Two tiers:
//! - Index store: embedded key-value store, source of truth
//!   (`IndexBucket`: word -> gzip(MessagePack(urls)))
//! - Cache tier: optional key-value cache with per-entry expiry, always
//!   rebuildable from the index store

pub mod cache;
pub mod codec;
pub mod sled_store;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::CacheConfig;

// Re-export for convenience
pub use cache::{MEMORY_CACHE_ADDRESS, MemoryCache, RedisCache};
pub use sled_store::{INDEX_BUCKET, SledStore};

/// Trait for index store backends.
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Write every entry in one atomic transaction, replacing existing
    /// values for the same words. Returns the number of entries written.
    async fn write_batch(&self, entries: Vec<(String, Vec<u8>)>) -> Result<usize>;

    /// Read the stored payload for `word`; `None` when absent.
    async fn read(&self, word: &str) -> Result<Option<Vec<u8>>>;

    /// Number of indexed words.
    async fn len(&self) -> Result<usize>;
}

/// Trait for cache tier backends.
#[async_trait]
pub trait CacheTier: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<String>>>;

    async fn set(&self, key: &str, urls: &[String], ttl: Duration) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

/// Connect the configured cache tier.
///
/// `memory` selects the in-process cache, anything else is a Redis URL.
/// Returns `None` when no cache is configured or the server cannot be
/// reached; the index then runs on the store alone.
pub async fn connect_cache(config: &CacheConfig) -> Option<Arc<dyn CacheTier>> {
    if !config.is_enabled() {
        return None;
    }
    if config.address.trim() == MEMORY_CACHE_ADDRESS {
        log::info!("Using in-process cache");
        return Some(Arc::new(MemoryCache::new()));
    }

    match RedisCache::connect(&config.address).await {
        Ok(cache) => {
            log::info!("Connected to cache at {}", config.address);
            Some(Arc::new(cache))
        }
        Err(e) => {
            log::warn!(
                "Cache at {} unavailable, continuing without it: {}",
                config.address,
                e
            );
            None
        }
    }
}
