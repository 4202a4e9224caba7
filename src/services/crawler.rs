// src/services/crawler.rs

//! Depth-bounded, domain-filtered concurrent web crawler.
//!
//! Every followed link becomes its own tokio task. All tasks of a crawler
//! share one [`RateLimiter`], one fetch [`Semaphore`], one [`WaitGroup`]
//! and one [`CollectedData`] store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::{Semaphore, watch};

use crate::error::{AppError, Result};
use crate::models::{CrawlStats, CrawlTarget, CrawlerConfig, Page, PageData};
use crate::services::fetcher::{HttpFetcher, PageFetcher};
use crate::services::tasks::{RateLimiter, TaskGuard, WaitGroup};
use crate::utils::url::normalize;

/// Thread-safe accumulator of page text per URL.
#[derive(Debug, Default)]
pub struct CollectedData {
    data: Mutex<PageData>,
}

impl CollectedData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one fragment for `url`; repeated fetches accumulate.
    pub fn add(&self, url: &str, fragment: String) {
        self.lock().entry(url.to_string()).or_default().push(fragment);
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> PageData {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PageData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shallowest depth a URL was claimed at, and whether its text is stored.
#[derive(Debug, Clone, Copy)]
struct Visit {
    depth: usize,
    collected: bool,
}

/// Concurrent crawler. Cloning yields another handle to the same run.
#[derive(Clone)]
pub struct Crawler {
    inner: Arc<CrawlerInner>,
}

struct CrawlerInner {
    fetcher: Arc<dyn PageFetcher>,
    max_depth: usize,
    track_visited: bool,
    filter_domain: RwLock<String>,
    rate_limiter: RateLimiter,
    permits: Semaphore,
    tasks: WaitGroup,
    collected: CollectedData,
    visited: Mutex<HashMap<String, Visit>>,
    cancel: watch::Sender<bool>,
    pages_fetched: AtomicUsize,
    fetch_failures: AtomicUsize,
    skipped_visited: AtomicUsize,
}

impl Crawler {
    /// Create a crawler that fetches pages through `fetcher`.
    pub fn new(config: &CrawlerConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            inner: Arc::new(CrawlerInner {
                fetcher,
                max_depth: config.max_depth,
                track_visited: config.track_visited,
                filter_domain: RwLock::new(config.filter_domain.clone()),
                rate_limiter: RateLimiter::new(config.rate_limit_interval()),
                permits: Semaphore::new(config.concurrency.max(1)),
                tasks: WaitGroup::new(),
                collected: CollectedData::new(),
                visited: Mutex::new(HashMap::new()),
                cancel,
                pages_fetched: AtomicUsize::new(0),
                fetch_failures: AtomicUsize::new(0),
                skipped_visited: AtomicUsize::new(0),
            }),
        }
    }

    /// Create a crawler that fetches over HTTP.
    pub fn with_http(config: &CrawlerConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(config)?;
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    /// Only follow links containing `domain`; empty follows every link.
    pub fn set_filter_domain(&self, domain: impl Into<String>) {
        *self
            .inner
            .filter_domain
            .write()
            .unwrap_or_else(PoisonError::into_inner) = domain.into();
    }

    pub fn filter_domain(&self) -> String {
        self.inner
            .filter_domain
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn max_depth(&self) -> usize {
        self.inner.max_depth
    }

    /// Crawl `url` at `depth` and spawn tasks for every followed link.
    ///
    /// Returns once this page is processed; use [`Crawler::wait`] for the
    /// spawned tasks. Beyond the maximum depth this is a no-op. An error
    /// only concerns this page. URLs are fetched and collected without
    /// their fragment.
    pub async fn crawl(&self, url: &str, depth: usize) -> Result<()> {
        self.visit(CrawlTarget::new(normalize(url), depth)).await
    }

    /// Block until every spawned crawl task has finished.
    pub async fn wait(&self) {
        self.inner.tasks.wait().await;
    }

    /// Number of spawned crawl tasks still running.
    pub fn pending_tasks(&self) -> usize {
        self.inner.tasks.pending()
    }

    /// Snapshot of the text collected so far.
    pub fn collected_data(&self) -> PageData {
        self.inner.collected.snapshot()
    }

    /// Stop starting new fetches and abandon the ones in flight.
    pub fn cancel(&self) {
        self.inner.cancel.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancel.borrow()
    }

    pub fn stats(&self) -> CrawlStats {
        CrawlStats {
            pages_fetched: self.inner.pages_fetched.load(Ordering::Relaxed),
            fetch_failures: self.inner.fetch_failures.load(Ordering::Relaxed),
            skipped_visited: self.inner.skipped_visited.load(Ordering::Relaxed),
        }
    }

    async fn visit(&self, target: CrawlTarget) -> Result<()> {
        if target.depth > self.inner.max_depth {
            return Ok(());
        }
        if self.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        if !self.claim(&target) {
            self.inner.skipped_visited.fetch_add(1, Ordering::Relaxed);
            log::debug!("Already visited {}", target.url);
            return Ok(());
        }

        log::debug!("Crawling [depth {}]: {}", target.depth, target.url);
        let page = match self.fetch(&target.url).await {
            Ok(page) => page,
            Err(AppError::Cancelled) => return Err(AppError::Cancelled),
            Err(e) => {
                self.inner.fetch_failures.fetch_add(1, Ordering::Relaxed);
                return Err(AppError::crawl(&target.url, e));
            }
        };
        self.inner.pages_fetched.fetch_add(1, Ordering::Relaxed);

        let Page { text, links } = page;
        if self.mark_collected(&target.url) {
            self.inner.collected.add(&target.url, text);
        }

        let filter = self.filter_domain();
        for link in links {
            if filter.is_empty() || link.contains(&filter) {
                self.spawn(target.child(normalize(&link)));
            }
        }
        Ok(())
    }

    /// Record `target` as visited; false if its URL was already reached at
    /// the same or a shallower depth.
    ///
    /// A URL first reached through a long path is claimed again when a
    /// shorter path arrives, so links below it are followed to the full
    /// depth.
    fn claim(&self, target: &CrawlTarget) -> bool {
        if !self.inner.track_visited {
            return true;
        }
        let mut visited = self.visits();
        match visited.get_mut(&target.url) {
            Some(visit) if visit.depth <= target.depth => false,
            Some(visit) => {
                log::debug!(
                    "Revisiting {} at depth {} (was {})",
                    target.url,
                    target.depth,
                    visit.depth
                );
                visit.depth = target.depth;
                true
            }
            None => {
                let visit = Visit {
                    depth: target.depth,
                    collected: false,
                };
                visited.insert(target.url.clone(), visit);
                true
            }
        }
    }

    /// True the first time text for `url` is stored while visits are tracked.
    fn mark_collected(&self, url: &str) -> bool {
        if !self.inner.track_visited {
            return true;
        }
        self.visits()
            .get_mut(url)
            .is_none_or(|visit| !std::mem::replace(&mut visit.collected, true))
    }

    fn visits(&self) -> std::sync::MutexGuard<'_, HashMap<String, Visit>> {
        self.inner
            .visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Rate-limited, concurrency-capped fetch that aborts on cancellation.
    async fn fetch(&self, url: &str) -> Result<Page> {
        let work = async {
            let _permit = self
                .inner
                .permits
                .acquire()
                .await
                .map_err(|e| AppError::crawl(url, e))?;
            self.inner.rate_limiter.acquire().await;
            self.inner.fetcher.fetch(url).await
        };

        tokio::select! {
            result = work => result,
            _ = cancelled(self.inner.cancel.subscribe()) => Err(AppError::Cancelled),
        }
    }

    fn spawn(&self, target: CrawlTarget) {
        // Register before spawning so the barrier can never observe zero
        // while this child is still pending.
        let guard = self.inner.tasks.add();
        tokio::spawn(self.clone().run_child(target, guard));
    }

    fn run_child(self, target: CrawlTarget, guard: TaskGuard) -> BoxFuture<'static, ()> {
        async move {
            let _guard = guard;
            match self.visit(target).await {
                Ok(()) | Err(AppError::Cancelled) => {}
                Err(e) => log::warn!("{e}"),
            }
        }
        .boxed()
    }
}

/// Resolves once the flag behind `rx` turns true.
async fn cancelled(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl std::fmt::Debug for Crawler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crawler")
            .field("max_depth", &self.inner.max_depth)
            .field("filter_domain", &self.filter_domain())
            .field("pending_tasks", &self.pending_tasks())
            .finish()
    }
}

/// Group collected URLs by host; handy for crawl summaries.
pub fn urls_by_domain(data: &PageData) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for url in data.keys() {
        let domain = crate::utils::url::get_domain(url).unwrap_or_default();
        *counts.entry(domain).or_insert(0) += 1;
    }
    counts
}
