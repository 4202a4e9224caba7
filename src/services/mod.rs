//! Service layer for the search engine.
//!
//! This module contains the business logic for:
//! - Page fetching and link extraction (`PageFetcher`, `HttpFetcher`)
//! - Concurrent crawling (`Crawler`)
//! - Index writes and point queries (`Indexer`)
//! - Keyword search and ranking (`Searcher`)

pub mod crawler;
pub mod fetcher;
pub mod indexer;
pub mod searcher;
pub mod tasks;

pub use crawler::{CollectedData, Crawler};
pub use fetcher::{HttpFetcher, PageFetcher};
pub use indexer::{DEFAULT_CACHE_TTL, Indexer};
pub use searcher::{DateExtractor, FixedOffsetDate, PatternDate, Searcher};
pub use tasks::{RateLimiter, TaskGuard, WaitGroup};
