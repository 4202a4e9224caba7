use std::sync::Arc;

use search_engine::{
    models::{Config, SearchOptions},
    pipeline,
    services::{Crawler, Indexer},
    storage::SledStore,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("user-agent", "search-engine-crawler/0.1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(body.to_string()),
        )
        .mount(server)
        .await;
}

async fn mock_site() -> MockServer {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"
            <html><body>
                <h1>Rust search engine</h1>
                <a href="/docs">Docs</a>
                <a href="/missing">Broken</a>
                <a href="https://elsewhere.invalid/page">Offsite</a>
            </body></html>
        "#,
    )
    .await;
    mount_page(
        &server,
        "/docs",
        r#"
            <html><body>
                <p>Rust docs index</p>
                <a href="/">Home</a>
            </body></html>
        "#,
    )
    .await;
    server
}

fn config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.crawler.seed_url = format!("{}/", server.uri());
    config.crawler.rate_limit_ms = 1;
    config.crawler.filter_domain = "127.0.0.1".to_string();
    config
}

fn indexer() -> Arc<Indexer> {
    Arc::new(Indexer::new(Arc::new(SledStore::temporary().unwrap()), None))
}

#[tokio::test]
async fn test_crawl_mock_site_and_search() {
    let server = mock_site().await;
    let config = config(&server);
    let crawler = Crawler::with_http(&config.crawler).unwrap();
    let indexer = indexer();

    let report = pipeline::run_crawl(&config, &crawler, &indexer).await.unwrap();

    assert_eq!(report.url_count, 2);
    assert_eq!(report.stats.pages_fetched, 2);
    assert_eq!(report.stats.fetch_failures, 1);
    assert!(report.stats.skipped_visited >= 1);
    assert!(!report.cancelled);

    let home = format!("{}/", server.uri());
    let docs = format!("{}/docs", server.uri());

    let results = pipeline::run_search(
        Arc::clone(&indexer),
        &config.search,
        "Rust index",
        &SearchOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(results, vec![docs.clone(), docs, home]);
}

#[tokio::test]
async fn test_depth_zero_only_fetches_seed() {
    let server = mock_site().await;
    let mut config = config(&server);
    config.crawler.max_depth = 0;
    let crawler = Crawler::with_http(&config.crawler).unwrap();
    let indexer = indexer();

    let report = pipeline::run_crawl(&config, &crawler, &indexer).await.unwrap();

    assert_eq!(report.url_count, 1);
    assert!(indexer.query("index").await.unwrap().is_empty());
    assert_eq!(
        indexer.query("engine").await.unwrap(),
        vec![format!("{}/", server.uri())]
    );
}

#[tokio::test]
async fn test_search_with_foreign_domain_filter_is_empty() {
    let server = mock_site().await;
    let config = config(&server);
    let crawler = Crawler::with_http(&config.crawler).unwrap();
    let indexer = indexer();
    pipeline::run_crawl(&config, &crawler, &indexer).await.unwrap();

    let options = SearchOptions::default().with_domain("example.org");
    let results = pipeline::run_search(indexer, &config.search, "rust", &options)
        .await
        .unwrap();

    assert!(results.is_empty());
}
