//! Search engine CLI
//!
//! Crawl a site into the local index, then query it.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use search_engine::{
    error::{AppError, Result},
    models::{Config, SearchOptions, SortBy},
    pipeline,
    services::Crawler,
};

/// search-engine - crawl, index and search web pages
#[derive(Parser, Debug)]
#[command(
    name = "search-engine",
    version,
    about = "Concurrent web crawler with a word-to-URL index"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl from the seed URL and index every collected page
    Crawl {
        /// Seed URL (overrides crawler.seed_url)
        #[arg(long)]
        seed: Option<String>,

        /// Maximum link depth (overrides crawler.max_depth)
        #[arg(long)]
        depth: Option<usize>,

        /// Only follow links containing this text (overrides crawler.filter_domain)
        #[arg(long)]
        filter: Option<String>,
    },

    /// Query the index
    Search {
        /// Space-separated keywords
        query: String,

        /// Keep only URLs containing this domain
        #[arg(long)]
        domain: Option<String>,

        /// Result ordering: relevance or date
        #[arg(long)]
        sort: Option<SortBy>,

        /// Print results as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging; `--verbose` wins over the configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.verbose, &level);

    let mut config = match loaded {
        Ok(config) => {
            log::info!("Loaded configuration from {}", cli.config.display());
            config
        }
        Err(e) => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                cli.config.display(),
                e
            );
            Config::default()
        }
    };

    match cli.command {
        Command::Crawl {
            seed,
            depth,
            filter,
        } => {
            if let Some(seed) = seed {
                config.crawler.seed_url = seed;
            }
            if let Some(depth) = depth {
                config.crawler.max_depth = depth;
            }
            if let Some(filter) = filter {
                config.crawler.filter_domain = filter;
            }
            config.validate()?;

            let indexer = pipeline::open_indexer(&config).await?;
            let crawler = Crawler::with_http(&config.crawler)?;

            let interrupt = crawler.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Interrupted, indexing what was collected so far");
                    interrupt.cancel();
                }
            });

            let report = pipeline::run_crawl(&config, &crawler, &indexer).await?;
            log::info!(
                "Crawl complete: {} URLs, {} words stored ({} failed)",
                report.url_count,
                report.index.stored,
                report.index.failed
            );
        }

        Command::Search {
            query,
            domain,
            sort,
            json,
        } => {
            let domain = domain.or_else(|| {
                Some(config.search.filter_domain.clone()).filter(|d| !d.is_empty())
            });
            let options = SearchOptions::new(domain, sort.unwrap_or(config.search.sort_by));

            let indexer = Arc::new(pipeline::open_indexer(&config).await?);
            let results = pipeline::run_search(indexer, &config.search, &query, &options).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No results for {query:?}");
            } else {
                for (i, url) in results.iter().enumerate() {
                    println!("{:>3}. {}", i + 1, url);
                }
            }
        }

        Command::Validate => {
            config.validate()?;
            if config.crawler.seed_url.trim().is_empty() {
                return Err(AppError::validation("crawler.seed_url is not set"));
            }
            log::info!("Configuration is valid");
            let rendered =
                toml::to_string_pretty(&config).map_err(|e| AppError::config(e.to_string()))?;
            println!("{rendered}");
        }
    }

    Ok(())
}
