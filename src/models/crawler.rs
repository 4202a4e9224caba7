// src/models/crawler.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// URL to fragments gathered during one crawl run.
pub type PageData = HashMap<String, Vec<String>>;

/// Word to URL postings, one URL entry per occurrence.
pub type Postings = HashMap<String, Vec<String>>;

/// A link waiting to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub url: String,
    /// Seed is depth 0, each followed link adds one
    pub depth: usize,
}

impl CrawlTarget {
    pub fn new(url: impl Into<String>, depth: usize) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }

    /// Target for a link found on this page.
    pub fn child(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: self.depth + 1,
        }
    }
}

/// Extracted content of a fetched page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub text: String,
    pub links: Vec<String>,
}

/// Counters of a crawl run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    pub pages_fetched: usize,
    pub fetch_failures: usize,
    pub skipped_visited: usize,
}

/// Outcome of writing one batch of postings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    /// Distinct words in the batch
    pub words: usize,
    /// Words committed to the index store
    pub stored: usize,
    /// Words dropped because their payload could not be built
    pub failed: usize,
    /// Words written to the cache tier
    pub cached: usize,
}

/// Summary of a crawl followed by indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub seed_url: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub url_count: usize,
    pub stats: CrawlStats,
    pub index: IndexReport,
    pub cancelled: bool,
}

impl CrawlReport {
    pub fn elapsed_secs(&self) -> f64 {
        (self.end_time - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}
