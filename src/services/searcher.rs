// src/services/searcher.rs

//! Keyword search over the inverted index.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::{DateStrategy, SearchOptions, SortBy};
use crate::services::indexer::Indexer;
use crate::utils::text::tokenize_query;

const DATE_PATTERN: &str = r"\d{4}-\d{2}-\d{2}";

/// Reads a `YYYY-MM-DD` date out of a result URL.
pub trait DateExtractor: Send + Sync {
    fn extract_date(&self, url: &str) -> Option<String>;
}

/// Date at a fixed character range of the URL.
///
/// The default range 17..27 fits URLs like `https://blog.io/x2024-01-31/...`.
pub struct FixedOffsetDate {
    start: usize,
    end: usize,
    pattern: Regex,
}

impl FixedOffsetDate {
    pub fn new(start: usize, end: usize) -> Result<Self> {
        let pattern = Regex::new(&format!("^{DATE_PATTERN}$"))
            .map_err(|e| AppError::config(format!("invalid date pattern: {e}")))?;
        Ok(Self {
            start,
            end,
            pattern,
        })
    }
}

impl DateExtractor for FixedOffsetDate {
    fn extract_date(&self, url: &str) -> Option<String> {
        let candidate = url.get(self.start..self.end)?;
        self.pattern
            .is_match(candidate)
            .then(|| candidate.to_string())
    }
}

/// First `YYYY-MM-DD` anywhere in the URL.
pub struct PatternDate {
    pattern: Regex,
}

impl PatternDate {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(DATE_PATTERN)
            .map_err(|e| AppError::config(format!("invalid date pattern: {e}")))?;
        Ok(Self { pattern })
    }
}

impl DateExtractor for PatternDate {
    fn extract_date(&self, url: &str) -> Option<String> {
        self.pattern.find(url).map(|m| m.as_str().to_string())
    }
}

/// Build the extractor for a configured strategy.
pub fn date_extractor(strategy: DateStrategy) -> Result<Arc<dyn DateExtractor>> {
    Ok(match strategy {
        DateStrategy::FixedOffset => Arc::new(FixedOffsetDate::new(17, 27)?),
        DateStrategy::Pattern => Arc::new(PatternDate::new()?),
    })
}

/// Answers keyword queries from an [`Indexer`].
pub struct Searcher {
    indexer: Arc<Indexer>,
    dates: Arc<dyn DateExtractor>,
}

impl Searcher {
    pub fn new(indexer: Arc<Indexer>) -> Result<Self> {
        Ok(Self::with_date_extractor(
            indexer,
            date_extractor(DateStrategy::default())?,
        ))
    }

    pub fn with_date_extractor(indexer: Arc<Indexer>, dates: Arc<dyn DateExtractor>) -> Self {
        Self { indexer, dates }
    }

    /// Look up every query word and rank the matching URLs.
    ///
    /// Repeated query words are looked up repeatedly, so they weigh more in
    /// relevance ordering.
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<String>> {
        let mut results = Vec::new();
        for word in tokenize_query(query) {
            results.extend(self.indexer.query(&word).await?);
        }

        Ok(self.rank(results, options))
    }

    /// Apply filtering and ordering to aggregated results.
    pub fn rank(&self, results: Vec<String>, options: &SearchOptions) -> Vec<String> {
        let results = match options.filter_domain.as_deref() {
            Some(domain) if !domain.is_empty() => filter_by_domain(results, domain),
            _ => results,
        };

        match options.sort_by {
            SortBy::Relevance => sort_by_relevance(results),
            SortBy::Date => self.keep_dated(results),
        }
    }

    /// Keep only URLs with an extractable date, in their current order.
    fn keep_dated(&self, results: Vec<String>) -> Vec<String> {
        results
            .into_iter()
            .filter(|url| self.dates.extract_date(url).is_some())
            .collect()
    }
}

/// Keep URLs containing `domain`, preserving order.
pub fn filter_by_domain(results: Vec<String>, domain: &str) -> Vec<String> {
    results
        .into_iter()
        .filter(|url| url.contains(domain))
        .collect()
}

/// Stable sort by how often each URL occurs in `results`, most frequent first.
pub fn sort_by_relevance(mut results: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for url in &results {
        *counts.entry(url.clone()).or_insert(0) += 1;
    }

    results.sort_by(|a, b| counts[b].cmp(&counts[a]));
    results
}
