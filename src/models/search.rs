// src/models/search.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Result ordering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Most frequently matched URLs first
    #[default]
    Relevance,
    /// Only URLs carrying an embedded date
    Date,
}

impl FromStr for SortBy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relevance" => Ok(Self::Relevance),
            "date" => Ok(Self::Date),
            other => Err(AppError::validation(format!(
                "unknown sort mode '{other}' (expected relevance or date)"
            ))),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relevance => f.write_str("relevance"),
            Self::Date => f.write_str("date"),
        }
    }
}

/// Where the date of a URL is looked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStrategy {
    /// Characters 17..27 of the URL
    #[default]
    FixedOffset,
    /// First `YYYY-MM-DD` anywhere in the URL
    Pattern,
}

/// Per-query search options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub filter_domain: Option<String>,
    pub sort_by: SortBy,
}

impl SearchOptions {
    pub fn new(filter_domain: Option<String>, sort_by: SortBy) -> Self {
        Self {
            filter_domain: filter_domain.filter(|d| !d.is_empty()),
            sort_by,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        let domain = domain.into();
        self.filter_domain = (!domain.is_empty()).then_some(domain);
        self
    }

    pub fn sorted_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }
}
