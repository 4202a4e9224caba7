// src/pipeline/crawl.rs

//! Crawl-then-index pipeline.

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::{Config, CrawlReport};
use crate::services::crawler::urls_by_domain;
use crate::services::{Crawler, Indexer};

/// Crawl from the configured seed, wait for every task, then index the
/// collected text.
///
/// A failure on the seed page is logged and leaves an empty collection.
/// After [`Crawler::cancel`] whatever was gathered so far is still indexed.
pub async fn run_crawl(config: &Config, crawler: &Crawler, indexer: &Indexer) -> Result<CrawlReport> {
    let seed_url = config.crawler.seed_url.trim();
    if seed_url.is_empty() {
        return Err(AppError::config("crawler.seed_url is not set"));
    }

    let start_time = Utc::now();
    log::info!(
        "Crawling {} (max depth {}, filter {:?})",
        seed_url,
        crawler.max_depth(),
        crawler.filter_domain()
    );

    match crawler.crawl(seed_url, 0).await {
        Ok(()) => {}
        Err(AppError::Cancelled) => log::warn!("Crawl cancelled before the seed was fetched"),
        Err(e) => log::error!("Seed {} failed: {}", seed_url, e),
    }
    crawler.wait().await;

    let pages = crawler.collected_data();
    let stats = crawler.stats();
    let cancelled = crawler.is_cancelled();
    log::info!(
        "Collected {} URLs ({} fetched, {} failed, {} already visited)",
        pages.len(),
        stats.pages_fetched,
        stats.fetch_failures,
        stats.skipped_visited
    );
    for (domain, count) in urls_by_domain(&pages) {
        log::debug!("  {}: {} URLs", domain, count);
    }

    let index = indexer.index_pages(&pages).await?;
    let end_time = Utc::now();

    let report = CrawlReport {
        seed_url: seed_url.to_string(),
        start_time,
        end_time,
        url_count: pages.len(),
        stats,
        index,
        cancelled,
    };
    log::info!(
        "Indexed {} words from {} URLs in {:.2}s{}",
        report.index.stored,
        report.url_count,
        report.elapsed_secs(),
        if cancelled { " (cancelled)" } else { "" }
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::models::Page;
    use crate::services::PageFetcher;
    use crate::storage::SledStore;

    struct SiteFetcher {
        pages: HashMap<String, Page>,
    }

    impl SiteFetcher {
        fn new(pages: Vec<(&str, &str, Vec<&str>)>) -> Self {
            let pages = pages
                .into_iter()
                .map(|(url, text, links)| {
                    let page = Page {
                        text: text.to_string(),
                        links: links.into_iter().map(String::from).collect(),
                    };
                    (url.to_string(), page)
                })
                .collect();
            Self { pages }
        }
    }

    #[async_trait]
    impl PageFetcher for SiteFetcher {
        async fn fetch(&self, url: &str) -> Result<Page> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::crawl(url, "not found"))
        }
    }

    fn config(seed: &str) -> Config {
        let mut config = Config::default();
        config.crawler.seed_url = seed.to_string();
        config.crawler.rate_limit_ms = 1;
        config
    }

    fn indexer() -> Indexer {
        Indexer::new(Arc::new(SledStore::temporary().unwrap()), None)
    }

    fn site() -> SiteFetcher {
        SiteFetcher::new(vec![
            (
                "https://a.com/",
                "Rust crawler home",
                vec!["https://a.com/docs", "https://b.com/"],
            ),
            ("https://a.com/docs", "rust docs", vec![]),
            ("https://b.com/", "other site", vec![]),
        ])
    }

    #[tokio::test]
    async fn test_run_crawl_indexes_collected_pages() {
        let config = config("https://a.com/");
        let crawler = Crawler::new(&config.crawler, Arc::new(site()));
        let indexer = indexer();

        let report = run_crawl(&config, &crawler, &indexer).await.unwrap();

        assert_eq!(report.url_count, 3);
        assert_eq!(report.stats.pages_fetched, 3);
        assert!(!report.cancelled);
        assert!(report.end_time >= report.start_time);

        let mut rust = indexer.query("rust").await.unwrap();
        rust.sort();
        assert_eq!(rust, vec!["https://a.com/", "https://a.com/docs"]);
        assert_eq!(indexer.query("other").await.unwrap(), vec!["https://b.com/"]);
    }

    #[tokio::test]
    async fn test_run_crawl_respects_filter() {
        let config = config("https://a.com/");
        let crawler = Crawler::new(&config.crawler, Arc::new(site()));
        crawler.set_filter_domain("a.com");
        let indexer = indexer();

        let report = run_crawl(&config, &crawler, &indexer).await.unwrap();

        assert_eq!(report.url_count, 2);
        assert!(indexer.query("other").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_seed_yields_empty_report() {
        let config = config("https://missing.com/");
        let crawler = Crawler::new(&config.crawler, Arc::new(site()));

        let report = run_crawl(&config, &crawler, &indexer()).await.unwrap();

        assert_eq!(report.url_count, 0);
        assert_eq!(report.stats.fetch_failures, 1);
        assert_eq!(report.index.words, 0);
    }

    #[tokio::test]
    async fn test_missing_seed_is_config_error() {
        let config = Config::default();
        let crawler = Crawler::new(&config.crawler, Arc::new(site()));

        let result = run_crawl(&config, &crawler, &indexer()).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_cancelled_crawl_still_reports() {
        let config = config("https://a.com/");
        let crawler = Crawler::new(&config.crawler, Arc::new(site()));
        crawler.cancel();

        let report = run_crawl(&config, &crawler, &indexer()).await.unwrap();

        assert!(report.cancelled);
        assert_eq!(report.url_count, 0);
    }
}
