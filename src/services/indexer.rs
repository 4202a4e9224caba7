// src/services/indexer.rs

//! Inverted index writer and point-query reader.
//!
//! Writes go to the index store in one transaction per batch and, when a
//! cache tier is configured, to the cache as well. Reads try the cache
//! first and fall back to the store, repopulating the cache on the way.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinSet;

use crate::error::Result;
use crate::models::{IndexReport, PageData, Postings};
use crate::storage::codec::{compress_urls, decompress_urls};
use crate::storage::{CacheTier, IndexStore};
use crate::utils::text::tokenize_text;

/// Lifetime of cache entries unless overridden.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Service writing and reading the word -> URLs index.
#[derive(Clone)]
pub struct Indexer {
    store: Arc<dyn IndexStore>,
    cache: Option<Arc<dyn CacheTier>>,
    cache_ttl: Duration,
}

impl Indexer {
    pub fn new(store: Arc<dyn IndexStore>, cache: Option<Arc<dyn CacheTier>>) -> Self {
        Self {
            store,
            cache,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    /// Index crawl output: every word occurrence in a page's text adds
    /// that page's URL to the word's list.
    pub async fn index_pages(&self, pages: &PageData) -> Result<IndexReport> {
        let postings = invert_pages(pages);
        log::info!(
            "Indexing {} words from {} pages",
            postings.len(),
            pages.len()
        );
        self.index(&postings).await
    }

    /// Store each word's URL list, replacing what was stored before.
    ///
    /// Payloads are built concurrently, one task per word, and committed in
    /// a single store transaction. A word whose payload cannot be built is
    /// logged and skipped. Cache writes run alongside and do not depend on
    /// the store outcome. Only a failing store transaction is an error.
    pub async fn index(&self, postings: &Postings) -> Result<IndexReport> {
        let mut report = IndexReport {
            words: postings.len(),
            ..IndexReport::default()
        };
        if postings.is_empty() {
            return Ok(report);
        }

        let mut encoders = JoinSet::new();
        for (word, urls) in postings {
            let word = word.clone();
            let urls = urls.clone();
            encoders.spawn_blocking(move || {
                let payload = compress_urls(&urls);
                (word, payload)
            });
        }

        let (entries, cached) = tokio::join!(
            collect_payloads(encoders, &mut report.failed),
            self.cache_postings(postings)
        );
        report.cached = cached;

        report.stored = self.store.write_batch(entries).await?;

        log::debug!(
            "Indexed {} words ({} stored, {} failed, {} cached)",
            report.words,
            report.stored,
            report.failed,
            report.cached
        );
        Ok(report)
    }

    /// URLs recorded for `word`, empty when the word is unknown.
    pub async fn query(&self, word: &str) -> Result<Vec<String>> {
        if let Some(cache) = &self.cache {
            match cache.get(word).await {
                Ok(Some(urls)) => {
                    log::debug!("Cache hit for '{word}'");
                    return Ok(urls);
                }
                Ok(None) => log::debug!("Cache miss for '{word}'"),
                Err(e) => log::warn!("Cache read for '{word}' failed, using index store: {e}"),
            }
        }

        let Some(payload) = self.store.read(word).await? else {
            return Ok(Vec::new());
        };

        let urls = match decompress_urls(&payload) {
            Ok(urls) => urls,
            Err(e) => {
                log::warn!("Discarding unreadable index entry for '{word}': {e}");
                return Ok(Vec::new());
            }
        };

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(word, &urls, self.cache_ttl).await {
                log::warn!("Failed to repopulate cache for '{word}': {e}");
            }
        }

        Ok(urls)
    }

    /// Write every word to the cache concurrently; returns how many succeeded.
    async fn cache_postings(&self, postings: &Postings) -> usize {
        let Some(cache) = &self.cache else {
            return 0;
        };

        let writes = postings.iter().map(|(word, urls)| async move {
            match cache.set(word, urls, self.cache_ttl).await {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Failed to cache '{word}': {e}");
                    false
                }
            }
        });

        join_all(writes).await.into_iter().filter(|ok| *ok).count()
    }
}

/// Drain the encoder tasks, keeping the payloads that were built.
async fn collect_payloads(
    mut encoders: JoinSet<(String, Result<Vec<u8>>)>,
    failed: &mut usize,
) -> Vec<(String, Vec<u8>)> {
    let mut entries = Vec::with_capacity(encoders.len());
    while let Some(joined) = encoders.join_next().await {
        match joined {
            Ok((word, Ok(payload))) => entries.push((word, payload)),
            Ok((word, Err(e))) => {
                *failed += 1;
                log::warn!("Failed to index word '{word}': {e}");
            }
            Err(e) => {
                *failed += 1;
                log::warn!("Index task failed: {e}");
            }
        }
    }
    entries
}

/// Turn URL -> fragments into word -> URLs, one URL entry per occurrence.
///
/// URLs are visited in sorted order so the output is deterministic.
pub fn invert_pages(pages: &PageData) -> Postings {
    let mut urls: Vec<&String> = pages.keys().collect();
    urls.sort();

    let mut postings = Postings::new();
    for url in urls {
        for fragment in &pages[url] {
            for word in tokenize_text(fragment) {
                postings.entry(word).or_default().push(url.clone());
            }
        }
    }
    postings
}
