// src/services/fetcher.rs

//! Page fetching and link extraction.

use async_trait::async_trait;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{CrawlerConfig, Page};
use crate::utils::http::{create_async_client, fetch_text};
use crate::utils::text::normalize_whitespace;
use crate::utils::url::resolve_link;

/// Source of crawlable pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its text and outbound links.
    async fn fetch(&self, url: &str) -> Result<Page>;
}

/// Fetcher backed by a real HTTP client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Page> {
        let base = Url::parse(url)?;
        let html = fetch_text(&self.client, url).await?;
        extract_page(&html, &base)
    }
}

/// Pull body text and resolved `<a href>` links out of an HTML document.
pub fn extract_page(html: &str, base: &Url) -> Result<Page> {
    let document = Html::parse_document(html);
    let body_sel = parse_selector("body")?;
    let link_sel = parse_selector("a[href]")?;

    let text = document
        .select(&body_sel)
        .next()
        .map(|body| normalize_whitespace(&body.text().collect::<Vec<_>>().join(" ")))
        .unwrap_or_default();

    let links = document
        .select(&link_sel)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_link(base, href))
        .collect();

    Ok(Page { text, links })
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::crawl("selector", format!("{s}: {e:?}")))
}
