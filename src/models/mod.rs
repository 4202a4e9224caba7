// src/models/mod.rs

//! Domain models for the search engine.
//!
//! This module contains the data structures shared by the crawler,
//! the indexer and the searcher.

mod config;
mod crawler;
mod search;

// Re-export all public types
pub use config::{CacheConfig, Config, CrawlerConfig, LoggingConfig, SearchConfig, StorageConfig};
pub use crawler::{CrawlReport, CrawlStats, CrawlTarget, IndexReport, Page, PageData, Postings};
pub use search::{DateStrategy, SearchOptions, SortBy};
