//! Integration tests for the crawl engine
//!
//! These tests drive the coordinator with an in-memory page fetcher so the
//! link graph, fetch counts and batch sizes are fully controlled.

use async_trait::async_trait;
use docsweep::config::{Config, ExtractionConfig};
use docsweep::crawler::{Coordinator, FetchFailure, PageFetcher, PageResult};
use docsweep::url::{canonicalize, CanonicalUrl};
use docsweep::SweepError;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

/// A fake site: canonical URL -> (content, raw hrefs)
#[derive(Default)]
struct FakeSite {
    pages: HashMap<String, (String, Vec<String>)>,
    fetched: Mutex<Vec<String>>,
    batch_sizes: Mutex<Vec<usize>>,
    drop_last_result: bool,
}

impl FakeSite {
    fn page(mut self, url: &str, content: &str, links: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            (content.to_string(), links.iter().map(|l| l.to_string()).collect()),
        );
        self
    }

    fn fetch_count(&self, url: &str) -> usize {
        self.fetched.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    fn total_fetches(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }

    fn largest_batch(&self) -> usize {
        self.batch_sizes.lock().unwrap().iter().copied().max().unwrap_or(0)
    }
}

#[async_trait]
impl PageFetcher for FakeSite {
    async fn fetch_batch(&self, urls: &[CanonicalUrl], _: &ExtractionConfig) -> Vec<PageResult> {
        self.batch_sizes.lock().unwrap().push(urls.len());

        let mut results: Vec<PageResult> = urls
            .iter()
            .map(|url| {
                self.fetched.lock().unwrap().push(url.to_string());
                match self.pages.get(url.as_str()) {
                    Some((content, links)) => PageResult::success(
                        url.clone(),
                        url.as_url().clone(),
                        content.clone(),
                        links.clone(),
                    ),
                    None => PageResult::failure(url.clone(), FetchFailure::Http { status: 404 }),
                }
            })
            .collect();

        // Keep the seed's result so only later batches lose one
        if self.drop_last_result && results.len() > 1 {
            results.pop();
        }
        results
    }
}

/// Fetcher handed to the coordinator; shares the site so counts stay readable
struct Shared<'a>(&'a FakeSite);

#[async_trait]
impl PageFetcher for Shared<'_> {
    async fn fetch_batch(&self, urls: &[CanonicalUrl], config: &ExtractionConfig) -> Vec<PageResult> {
        self.0.fetch_batch(urls, config).await
    }
}

fn config(out: &Path, seed: &str, max_pages: usize, concurrency: usize) -> Config {
    let mut config = Config::default();
    config.crawl.seed_url = seed.to_string();
    config.crawl.scope_pattern = r".*\/docs\/.*".to_string();
    config.crawl.max_pages = max_pages;
    config.crawl.concurrency = concurrency;
    config.crawl.idle_poll_ms = 1;
    config.output.base_dir = out.to_string_lossy().into_owned();
    config
}

async fn crawl(site: &FakeSite, config: Config) -> Result<docsweep::CrawlStatistics, SweepError> {
    let mut coordinator = Coordinator::with_fetcher(config, Shared(site))?;
    coordinator.run().await
}

fn md_files(root: &Path) -> Vec<String> {
    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                found.push(path.strip_prefix(root).unwrap().to_string_lossy().into_owned());
            }
        }
    }
    found.sort();
    found
}

#[tokio::test]
async fn test_scope_and_self_links() {
    let dir = TempDir::new().unwrap();
    let site = FakeSite::default()
        .page("https://site/docs/a", "# A", &["/docs/b", "/other", "/docs/a"])
        .page("https://site/docs/b", "# B", &[])
        .page("https://site/other", "# Other", &[]);

    let stats = crawl(&site, config(dir.path(), "https://site/docs/a", 1000, 5))
        .await
        .unwrap();

    assert_eq!(md_files(dir.path()), vec!["site/docs/a.md", "site/docs/b.md"]);
    assert_eq!(site.fetch_count("https://site/docs/a"), 1);
    assert_eq!(site.fetch_count("https://site/docs/b"), 1);
    assert_eq!(site.fetch_count("https://site/other"), 0);
    assert_eq!(stats.pages_written, 2);
    assert_eq!(stats.links_out_of_scope, 1);
}

#[tokio::test]
async fn test_seed_already_captured() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("site/docs")).unwrap();
    fs::write(dir.path().join("site/docs/a.md"), "saved earlier").unwrap();

    let site = FakeSite::default().page("https://site/docs/a", "# A", &["/docs/b"]);
    let stats = crawl(&site, config(dir.path(), "https://site/docs/a", 1000, 5))
        .await
        .unwrap();

    assert_eq!(site.total_fetches(), 0);
    assert_eq!(stats.pages_visited, 1);
    assert_eq!(stats.pages_already_captured, 1);
    assert_eq!(
        fs::read_to_string(dir.path().join("site/docs/a.md")).unwrap(),
        "saved earlier"
    );
}

#[tokio::test]
async fn test_second_run_refetches_nothing() {
    let dir = TempDir::new().unwrap();
    let build = || {
        FakeSite::default()
            .page("https://site/docs/a", "# A", &["/docs/b", "/docs/c"])
            .page("https://site/docs/b", "# B", &["/docs/c"])
            .page("https://site/docs/c", "# C", &[])
    };

    let first = build();
    crawl(&first, config(dir.path(), "https://site/docs/a", 1000, 5))
        .await
        .unwrap();
    assert_eq!(first.total_fetches(), 3);

    let second = build();
    let stats = crawl(&second, config(dir.path(), "https://site/docs/a", 1000, 5))
        .await
        .unwrap();
    assert_eq!(second.total_fetches(), 0);
    assert_eq!(stats.pages_written, 0);
}

#[tokio::test]
async fn test_captured_pages_skipped_mid_crawl() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("site/docs")).unwrap();
    fs::write(dir.path().join("site/docs/b.md"), "kept").unwrap();

    let site = FakeSite::default()
        .page("https://site/docs/a", "# A", &["/docs/b", "/docs/c"])
        .page("https://site/docs/b", "# B", &[])
        .page("https://site/docs/c", "# C", &[]);

    let stats = crawl(&site, config(dir.path(), "https://site/docs/a", 1000, 5))
        .await
        .unwrap();

    assert_eq!(site.fetch_count("https://site/docs/b"), 0);
    assert_eq!(site.fetch_count("https://site/docs/c"), 1);
    assert_eq!(stats.pages_already_captured, 1);
    assert_eq!(fs::read_to_string(dir.path().join("site/docs/b.md")).unwrap(), "kept");
}

#[tokio::test]
async fn test_terminates_on_cyclic_graph_without_refetching() {
    let dir = TempDir::new().unwrap();
    let mut site = FakeSite::default();
    for i in 0..20 {
        let next = format!("/docs/p{}/?from={}#top", (i + 1) % 20, i);
        let back = format!("https://site/docs/p{}", (i + 19) % 20);
        site = site.page(&format!("https://site/docs/p{}", i), "page", &[&next, &back]);
    }

    let stats = crawl(&site, config(dir.path(), "https://site/docs/p0", usize::MAX, 3))
        .await
        .unwrap();

    assert_eq!(stats.pages_visited, 20);
    assert_eq!(site.total_fetches(), 20);
    for i in 0..20 {
        assert_eq!(site.fetch_count(&format!("https://site/docs/p{}", i)), 1);
    }
}

#[tokio::test]
async fn test_page_cap_overshoots_by_less_than_a_batch() {
    let dir = TempDir::new().unwrap();
    let hrefs: Vec<String> = (0..50).map(|i| format!("/docs/leaf{}", i)).collect();
    let links: Vec<&str> = hrefs.iter().map(String::as_str).collect();
    let mut site = FakeSite::default().page("https://site/docs/hub", "hub", &links);
    for href in &hrefs {
        site = site.page(&format!("https://site{}", href), "leaf", &[]);
    }

    let (max_pages, concurrency) = (10, 4);
    let stats = crawl(&site, config(dir.path(), "https://site/docs/hub", max_pages, concurrency))
        .await
        .unwrap();

    let visited = stats.pages_visited as usize;
    assert!(visited >= max_pages);
    assert!(visited < max_pages + concurrency);
    assert!(site.largest_batch() <= concurrency);
}

#[tokio::test]
async fn test_page_cap_counts_captured_pages() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("site/docs")).unwrap();
    let hrefs: Vec<String> = (0..50).map(|i| format!("/docs/leaf{}", i)).collect();
    let links: Vec<&str> = hrefs.iter().map(String::as_str).collect();
    let mut site = FakeSite::default().page("https://site/docs/hub", "hub", &links);
    for (i, href) in hrefs.iter().enumerate() {
        fs::write(dir.path().join(format!("site/docs/leaf{}.md", i)), "old").unwrap();
        site = site.page(&format!("https://site{}", href), "leaf", &[]);
    }

    let (max_pages, concurrency) = (10, 4);
    let stats = crawl(&site, config(dir.path(), "https://site/docs/hub", max_pages, concurrency))
        .await
        .unwrap();

    assert_eq!(site.total_fetches(), 1);
    assert_eq!(stats.pages_visited as usize, max_pages);
    assert_eq!(stats.pages_already_captured as usize, max_pages - 1);
}

#[tokio::test]
async fn test_failed_fetch_does_not_stop_crawl() {
    let dir = TempDir::new().unwrap();
    let site = FakeSite::default()
        .page("https://site/docs/a", "# A", &["/docs/missing", "/docs/c"])
        .page("https://site/docs/c", "# C", &["/docs/missing"]);

    let stats = crawl(&site, config(dir.path(), "https://site/docs/a", 1000, 5))
        .await
        .unwrap();

    assert_eq!(site.fetch_count("https://site/docs/missing"), 1);
    assert_eq!(stats.fetch_failures, 1);
    assert_eq!(stats.pages_visited, 3);
    assert!(!dir.path().join("site/docs/missing.md").exists());
    assert!(dir.path().join("site/docs/c.md").exists());
}

#[tokio::test]
async fn test_empty_content_followed_but_not_written() {
    let dir = TempDir::new().unwrap();
    let site = FakeSite::default()
        .page("https://site/docs/a", "", &["/docs/b"])
        .page("https://site/docs/b", "# B", &[]);

    let stats = crawl(&site, config(dir.path(), "https://site/docs/a", 1000, 5))
        .await
        .unwrap();

    assert_eq!(md_files(dir.path()), vec!["site/docs/b.md"]);
    assert_eq!(stats.pages_empty, 1);
}

#[tokio::test]
async fn test_lost_results_still_drain() {
    let dir = TempDir::new().unwrap();
    let site = FakeSite {
        drop_last_result: true,
        ..FakeSite::default()
    }
    .page("https://site/docs/a", "# A", &["/docs/b", "/docs/c", "/docs/d"])
    .page("https://site/docs/b", "# B", &[])
    .page("https://site/docs/c", "# C", &[])
    .page("https://site/docs/d", "# D", &[]);

    let stats = crawl(&site, config(dir.path(), "https://site/docs/a", 1000, 5))
        .await
        .unwrap();

    assert_eq!(stats.pages_visited, 4);
    assert_eq!(stats.missing_results, 1);
    assert_eq!(site.total_fetches(), 4);
}

#[tokio::test]
async fn test_unreachable_seed_aborts() {
    let dir = TempDir::new().unwrap();
    let site = FakeSite::default();

    let result = crawl(&site, config(dir.path(), "https://site/docs/a", 1000, 5)).await;

    assert!(matches!(result, Err(SweepError::SeedUnreachable { .. })));
    assert!(md_files(dir.path()).is_empty());
}

#[tokio::test]
async fn test_out_of_scope_seed_is_still_crawled() {
    let dir = TempDir::new().unwrap();
    let site = FakeSite::default()
        .page("https://site/start", "# Start", &["/docs/a", "/blog/x"])
        .page("https://site/docs/a", "# A", &[]);

    crawl(&site, config(dir.path(), "https://site/start", 1000, 5))
        .await
        .unwrap();

    assert_eq!(md_files(dir.path()), vec!["site/docs/a.md", "site/start.md"]);
    assert_eq!(site.fetch_count("https://site/blog/x"), 0);
    assert_eq!(
        canonicalize("https://site/start/").unwrap().as_str(),
        "https://site/start"
    );
}
