//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{DateStrategy, SortBy};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Embedded index store settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Optional cache tier in front of the index store
    #[serde(default)]
    pub cache: CacheConfig,

    /// Query defaults
    #[serde(default)]
    pub search: SearchConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.concurrency == 0 {
            return Err(AppError::validation("crawler.concurrency must be > 0"));
        }
        if self.crawler.rate_limit_ms == 0 {
            return Err(AppError::validation("crawler.rate_limit_ms must be > 0"));
        }
        if self.storage.path.as_os_str().is_empty() {
            return Err(AppError::validation("storage.path is empty"));
        }
        if self.cache.ttl_secs == 0 {
            return Err(AppError::validation("cache.ttl_secs must be > 0"));
        }
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Address the crawl starts from
    #[serde(default)]
    pub seed_url: String,

    /// Deepest link level that is still fetched (the seed is depth 0)
    #[serde(default = "defaults::max_depth")]
    pub max_depth: usize,

    /// Maximum simultaneous fetches
    #[serde(default = "defaults::concurrency")]
    pub concurrency: usize,

    /// Substring a link must contain to be followed; empty follows everything
    #[serde(default)]
    pub filter_domain: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Interval between two outbound requests in milliseconds
    #[serde(default = "defaults::rate_limit")]
    pub rate_limit_ms: u64,

    /// Skip URLs that were already fetched during this run
    #[serde(default = "defaults::track_visited")]
    pub track_visited: bool,
}

impl CrawlerConfig {
    pub fn rate_limit_interval(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: String::new(),
            max_depth: defaults::max_depth(),
            concurrency: defaults::concurrency(),
            filter_domain: String::new(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            rate_limit_ms: defaults::rate_limit(),
            track_visited: defaults::track_visited(),
        }
    }
}

/// Embedded index store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the on-disk index database
    #[serde(default = "defaults::storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: defaults::storage_path(),
        }
    }
}

/// Cache tier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis connection URL, or `memory` for an in-process cache; empty
    /// disables the cache tier
    #[serde(default)]
    pub address: String,

    /// Entry lifetime in seconds
    #[serde(default = "defaults::cache_ttl")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn is_enabled(&self) -> bool {
        !self.address.trim().is_empty()
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            ttl_secs: defaults::cache_ttl(),
        }
    }
}

/// Query defaults used when the caller does not override them.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchConfig {
    #[serde(default)]
    pub sort_by: SortBy,

    #[serde(default)]
    pub filter_domain: String,

    /// How a publication date is read out of a result URL
    #[serde(default)]
    pub date_strategy: DateStrategy,
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Crawler defaults
    pub fn max_depth() -> usize {
        2
    }
    pub fn concurrency() -> usize {
        5
    }
    pub fn user_agent() -> String {
        "search-engine-crawler/0.1".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn rate_limit() -> u64 {
        500
    }
    pub fn track_visited() -> bool {
        true
    }

    // Storage defaults
    pub fn storage_path() -> PathBuf {
        PathBuf::from("data/index.db")
    }

    // Cache defaults
    pub fn cache_ttl() -> u64 {
        60 * 60
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
