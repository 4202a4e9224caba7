// src/pipeline/search.rs

use std::sync::Arc;

use crate::error::Result;
use crate::models::{SearchConfig, SearchOptions};
use crate::services::searcher::date_extractor;
use crate::services::{Indexer, Searcher};

/// Run one keyword query against the index.
pub async fn run_search(
    indexer: Arc<Indexer>,
    config: &SearchConfig,
    query: &str,
    options: &SearchOptions,
) -> Result<Vec<String>> {
    let searcher = Searcher::with_date_extractor(indexer, date_extractor(config.date_strategy)?);

    log::debug!(
        "Searching {:?} (sort {}, domain {:?})",
        query,
        options.sort_by,
        options.filter_domain
    );
    let results = searcher.search(query, options).await?;
    log::info!("{} results for {:?}", results.len(), query);

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateStrategy, Postings, SortBy};
    use crate::storage::SledStore;

    async fn indexer() -> Arc<Indexer> {
        let indexer = Indexer::new(Arc::new(SledStore::temporary().unwrap()), None);
        let mut postings = Postings::new();
        postings.insert(
            "release".into(),
            vec![
                "https://blog.io/x2024-05-01/notes".into(),
                "https://blog.io/2024-05-01/notes".into(),
                "https://docs.rs/release".into(),
            ],
        );
        indexer.index(&postings).await.unwrap();
        Arc::new(indexer)
    }

    #[tokio::test]
    async fn test_run_search_with_domain_filter() {
        let options = SearchOptions::default().with_domain("docs.rs");

        let results = run_search(indexer().await, &SearchConfig::default(), "release", &options)
            .await
            .unwrap();

        assert_eq!(results, vec!["https://docs.rs/release"]);
    }

    #[tokio::test]
    async fn test_run_search_uses_configured_date_strategy() {
        let options = SearchOptions::default().sorted_by(SortBy::Date);

        let fixed = run_search(indexer().await, &SearchConfig::default(), "release", &options)
            .await
            .unwrap();
        assert_eq!(fixed, vec!["https://blog.io/x2024-05-01/notes"]);

        let config = SearchConfig {
            date_strategy: DateStrategy::Pattern,
            ..SearchConfig::default()
        };
        let pattern = run_search(indexer().await, &config, "release", &options)
            .await
            .unwrap();
        assert_eq!(
            pattern,
            vec![
                "https://blog.io/x2024-05-01/notes",
                "https://blog.io/2024-05-01/notes"
            ]
        );
    }
}
