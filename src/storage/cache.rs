// src/storage/cache.rs

//! Cache tier implementations.
//!
//! The cache only ever holds copies of index store values; any entry may be
//! missing or expired and callers fall back to the store.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use moka::Expiry;

use crate::error::{AppError, Result};
use crate::storage::CacheTier;
use crate::storage::codec::{decode_list, encode_list};

/// How long to wait for the cache server before giving up on it.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis-backed cache tier.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Connect to the Redis server at `address` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(address: &str) -> Result<Self> {
        let client = redis::Client::open(address)?;
        let conn = tokio::time::timeout(CONNECT_TIMEOUT, client.get_connection_manager())
            .await
            .map_err(|_| {
                AppError::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("connecting to cache at {address} timed out"),
                ))
            })??;
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheTier for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<String>>> {
        let mut conn = self.conn.clone();
        let bytes: Option<Vec<u8>> = conn.get(key).await?;
        bytes.map(|b| decode_list(&b)).transpose()
    }

    async fn set(&self, key: &str, urls: &[String], ttl: Duration) -> Result<()> {
        let payload = encode_list(urls)?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, payload, ttl.as_secs().max(1))
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}

/// Cache address that selects [`MemoryCache`] instead of Redis.
pub const MEMORY_CACHE_ADDRESS: &str = "memory";

/// Entries kept by [`MemoryCache`] before the least used are evicted.
const MEMORY_CACHE_CAPACITY: u64 = 100_000;

/// In-process cache tier with per-entry expiry.
#[derive(Clone)]
pub struct MemoryCache {
    entries: moka::future::Cache<String, CachedList>,
}

#[derive(Clone)]
struct CachedList {
    urls: Vec<String>,
    ttl: Duration,
}

/// Expires every entry after the TTL it was last written with.
struct PerEntryTtl;

impl Expiry<String, CachedList> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedList,
        _created_at: std::time::Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedList,
        _updated_at: std::time::Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: moka::future::Cache::builder()
                .max_capacity(MEMORY_CACHE_CAPACITY)
                .expire_after(PerEntryTtl)
                .build(),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheTier for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<String>>> {
        Ok(self.entries.get(key).await.map(|entry| entry.urls))
    }

    async fn set(&self, key: &str, urls: &[String], ttl: Duration) -> Result<()> {
        let entry = CachedList {
            urls: urls.to_vec(),
            ttl,
        };
        self.entries.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.invalidate(key).await;
        Ok(())
    }
}
