//! Page fetching
//!
//! This module defines the page fetcher contract the crawl engine depends on,
//! and the HTTP implementation used in production:
//! - Building HTTP clients with proper user agent strings
//! - Fetching one batch of pages concurrently
//! - Classifying per-URL failures
//! - Extracting content and links from successful responses

use crate::config::{Config, ExtractionConfig, UserAgentConfig};
use crate::crawler::parser::Extractor;
use crate::url::CanonicalUrl;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why a single page could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("HTTP {status}")]
    Http { status: u16 },

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("expected HTML, got '{content_type}'")]
    NotHtml { content_type: String },

    #[error("failed to read body: {0}")]
    Body(String),

    #[error("extraction failed: {0}")]
    Extraction(String),
}

/// Content and links of a successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchedPage {
    /// Readable content to persist
    pub content: String,

    /// Hrefs found on the page, unresolved
    pub links: Vec<String>,
}

/// Outcome of one fetch attempt
///
/// Content and links exist only on success, which the `Result` encodes.
#[derive(Debug, Clone)]
pub struct PageResult {
    /// The canonical URL that was dispatched
    pub url: CanonicalUrl,

    /// URL the page was served from (after redirects); relative links resolve against it
    pub base_url: Url,

    pub outcome: Result<FetchedPage, FetchFailure>,
}

impl PageResult {
    pub fn success(url: CanonicalUrl, base_url: Url, content: String, links: Vec<String>) -> Self {
        Self {
            url,
            base_url,
            outcome: Ok(FetchedPage { content, links }),
        }
    }

    pub fn failure(url: CanonicalUrl, failure: FetchFailure) -> Self {
        let base_url = url.as_url().clone();
        Self {
            url,
            base_url,
            outcome: Err(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Retrieves batches of pages
///
/// Implementations fetch every URL of a batch (concurrently if they wish)
/// and return only once all of them are resolved, with exactly one
/// [`PageResult`] per input URL. Results may come back in any order. A
/// failure is per URL and never fails the batch.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_batch(&self, urls: &[CanonicalUrl], config: &ExtractionConfig) -> Vec<PageResult>;
}

/// Fetches pages over HTTP and extracts their content as Markdown
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    concurrency: usize,
}

impl HttpFetcher {
    /// Builds a fetcher from the crawl and user agent settings
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawl.request_timeout_secs),
        )?;
        Ok(Self::with_client(client, config.crawl.concurrency))
    }

    /// Wraps an existing client
    pub fn with_client(client: Client, concurrency: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetches and extracts one page; never fails the caller
    async fn fetch_page(&self, url: CanonicalUrl, extractor: &Extractor) -> PageResult {
        tracing::debug!("Fetching {}", url);

        let response = match self.client.get(url.as_str()).send().await {
            Ok(response) => response,
            Err(e) => return PageResult::failure(url, classify_error(&e)),
        };

        let status = response.status();
        let base_url = response.url().clone();

        if !status.is_success() {
            return PageResult::failure(
                url,
                FetchFailure::Http {
                    status: status.as_u16(),
                },
            );
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html(&content_type) {
            return PageResult::failure(url, FetchFailure::NotHtml { content_type });
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return PageResult::failure(url, FetchFailure::Body(e.to_string())),
        };

        let page = extractor.extract(&body, &base_url);
        tracing::debug!(
            "Extracted {} ({}): {} bytes, {} links",
            url,
            page.title.as_deref().unwrap_or("untitled"),
            page.content.len(),
            page.links.len()
        );
        PageResult::success(url, base_url, page.content, page.links)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_batch(&self, urls: &[CanonicalUrl], config: &ExtractionConfig) -> Vec<PageResult> {
        let extractor = match Extractor::new(config) {
            Ok(extractor) => extractor,
            Err(e) => {
                return urls
                    .iter()
                    .map(|url| PageResult::failure(url.clone(), FetchFailure::Extraction(e.to_string())))
                    .collect();
            }
        };

        stream::iter(urls.iter().cloned())
            .map(|url| self.fetch_page(url, &extractor))
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed (up to 10 hops); the final URL becomes the base for
/// resolving the page's relative links.
///
/// # Example
///
/// ```no_run
/// use docsweep::config::UserAgentConfig;
/// use docsweep::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true for HTML content types; a missing header is given the benefit of the doubt
fn is_html(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.is_empty()
        || content_type.contains("text/html")
        || content_type.contains("application/xhtml+xml")
}

fn classify_error(e: &reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::Timeout
    } else if e.is_connect() {
        FetchFailure::Connect(e.to_string())
    } else if let Some(status) = e.status() {
        FetchFailure::Http {
            status: status.as_u16(),
        }
    } else {
        FetchFailure::Network(e.to_string())
    }
}
