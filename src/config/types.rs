use serde::Deserialize;

/// Seed URL the compiled-in configuration starts from
pub const DEFAULT_SEED_URL: &str = "https://bybit-exchange.github.io/docs/v5/guide";

/// Scope pattern the compiled-in configuration restricts traversal to
pub const DEFAULT_SCOPE_PATTERN: &str = r".*/docs/v5/.*";

/// Main configuration structure for Docsweep
///
/// Every section has a default, so an empty TOML file (or no file at all)
/// yields the compiled-in configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// URL the crawl starts from
    pub seed_url: String,

    /// Regular expression a discovered link must match to be enqueued
    pub scope_pattern: String,

    /// Stop once this many URLs have reached the visited set
    pub max_pages: usize,

    /// Maximum number of URLs dispatched (and fetched concurrently) per batch
    pub concurrency: usize,

    /// Wait between polls when nothing is queued but fetches are pending (milliseconds)
    pub idle_poll_ms: u64,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed_url: DEFAULT_SEED_URL.to_string(),
            scope_pattern: DEFAULT_SCOPE_PATTERN.to_string(),
            max_pages: 1000,
            concurrency: 5,
            idle_poll_ms: 500,
            request_timeout_secs: 30,
        }
    }
}

/// Content extraction configuration handed to the page fetcher
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExtractionConfig {
    /// CSS selectors of the content regions to keep; empty keeps the whole body
    pub content_selectors: Vec<String>,

    /// Tags removed from the content before conversion
    pub excluded_tags: Vec<String>,

    /// Strip common modal, popup and cookie-banner elements
    pub remove_overlay_elements: bool,

    /// Only report links that stay on the host of the page they were found on
    pub same_site_links_only: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            content_selectors: vec!["article".to_string()],
            excluded_tags: ["nav", "footer", "header", "aside"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            remove_overlay_elements: true,
            same_site_links_only: true,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Root directory pages are written under
    pub base_dir: String,

    /// Extension appended to every page file (without the dot)
    pub extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: "bybit_docs".to_string(),
            extension: "md".to_string(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "docsweep".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}
