//! Pipeline entry points.
//!
//! - `open_indexer`: Open the index store and optional cache tier
//! - `run_crawl`: Crawl from the seed URL, then index what was collected
//! - `run_search`: Answer a keyword query from the index

pub mod crawl;
pub mod index;
pub mod search;

pub use crawl::run_crawl;
pub use index::open_indexer;
pub use search::run_search;
