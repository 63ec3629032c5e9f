//! Integration tests for the HTTP stack
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use docsweep::config::Config;
use docsweep::crawler::{HttpFetcher, PageFetcher};
use docsweep::url::canonicalize;
use docsweep::{run_crawl, PageWriter, SweepError};
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html_page(title: &str, article: &str) -> String {
    format!(
        r#"<html><head><title>{title}</title><script>var tracking = 1;</script></head>
<body>
  <nav><a href="/docs/guide">Guide</a><a href="/docs/nav-only">Nav only</a></nav>
  <div class="cookie-banner">We use cookies</div>
  <article>{article}</article>
  <footer>Copyright</footer>
</body></html>"#
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

fn test_config(server: &MockServer, out: &TempDir) -> Config {
    let mut config = Config::default();
    config.crawl.seed_url = format!("{}/docs/guide", server.uri());
    config.crawl.scope_pattern = r".*/docs/.*".to_string();
    config.crawl.concurrency = 2;
    config.crawl.request_timeout_secs = 5;
    config.output.base_dir = out.path().to_string_lossy().into_owned();
    config
}

fn file_for(config: &Config, path: &str) -> std::path::PathBuf {
    let writer = PageWriter::from_config(&config.output);
    let base = url::Url::parse(&config.crawl.seed_url).unwrap();
    writer.path_for(&canonicalize(base.join(path).unwrap().as_str()).unwrap())
}

#[tokio::test]
async fn test_full_crawl_writes_markdown() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs/guide"))
        .respond_with(html(html_page(
            "Guide",
            r#"<h1>Getting started</h1><p>Read the <a href="market/tickers?lang=en">tickers</a> page.</p>
               <a href="/blog/post">Blog</a><a href="https://elsewhere.test/docs/x">External</a>"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/market/tickers"))
        .respond_with(html(html_page("Tickers", "<h2>Tickers</h2><p>Latest prices.</p>")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/nav-only"))
        .respond_with(html(html_page("Nav", "<p>Linked from navigation.</p>")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/blog/post"))
        .respond_with(html(html_page("Blog", "<p>Out of scope</p>")))
        .expect(0)
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let config = test_config(&server, &out);
    let guide = file_for(&config, "/docs/guide");
    let tickers = file_for(&config, "/docs/market/tickers");

    let stats = run_crawl(config).await.unwrap();

    assert_eq!(stats.pages_written, 3);
    assert_eq!(stats.fetch_failures, 0);

    let markdown = fs::read_to_string(&guide).unwrap();
    assert!(markdown.contains("Getting started"));
    assert!(!markdown.contains("Copyright"));
    assert!(!markdown.contains("cookies"));
    assert!(!markdown.contains("tracking"));

    let markdown = fs::read_to_string(&tickers).unwrap();
    assert!(markdown.contains("Latest prices."));
}

#[tokio::test]
async fn test_failed_pages_are_not_written() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs/guide"))
        .respond_with(html(html_page(
            "Guide",
            r#"<p>Start</p><a href="/docs/broken">Broken</a><a href="/docs/file.pdf">PDF</a>"#,
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/file.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/nav-only"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let config = test_config(&server, &out);
    let broken = file_for(&config, "/docs/broken");

    let stats = run_crawl(config).await.unwrap();

    assert_eq!(stats.pages_written, 1);
    assert_eq!(stats.fetch_failures, 3);
    assert!(!broken.exists());
}

#[tokio::test]
async fn test_unreachable_seed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs/guide"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let result = run_crawl(test_config(&server, &out)).await;

    assert!(matches!(result, Err(SweepError::SeedUnreachable { .. })));
}

#[tokio::test]
async fn test_rerun_issues_no_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs/guide"))
        .respond_with(html(html_page("Guide", "<p>Only page</p>")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/nav-only"))
        .respond_with(html(html_page("Nav", "<p>Nav</p>")))
        .expect(1)
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let first = run_crawl(test_config(&server, &out)).await.unwrap();
    assert_eq!(first.pages_written, 2);

    let second = run_crawl(test_config(&server, &out)).await.unwrap();
    assert_eq!(second.pages_written, 0);
    assert_eq!(second.pages_already_captured, 1);
}

#[tokio::test]
async fn test_redirect_base_used_for_links() {
    let server = MockServer::start().await;
    let location = format!("{}/docs/new/", server.uri());

    Mock::given(method("GET"))
        .and(path("/docs/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", location.as_str()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/new/"))
        .respond_with(html(r#"<html><body><article><p>New</p><a href="child">Child</a></article></body></html>"#.to_string()))
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let config = test_config(&server, &out);
    let fetcher = HttpFetcher::new(&config).unwrap();
    let old = canonicalize(&format!("{}/docs/old", server.uri())).unwrap();

    let results = fetcher.fetch_batch(&[old.clone()], &config.extraction).await;

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.url, old);
    assert_eq!(result.base_url.path(), "/docs/new/");
    let page = result.outcome.as_ref().unwrap();
    assert_eq!(page.links, vec!["child".to_string()]);
    let child = docsweep::resolve(&result.base_url, &page.links[0]).unwrap();
    assert!(child.as_str().ends_with("/docs/new/child"));
}

#[tokio::test]
async fn test_user_agent_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs/guide"))
        .and(header("user-agent", format!("docsweep/{}", env!("CARGO_PKG_VERSION")).as_str()))
        .respond_with(html("<html><body><article>ok</article></body></html>".to_string()))
        .expect(1)
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let stats = run_crawl(test_config(&server, &out)).await.unwrap();
    assert_eq!(stats.pages_written, 1);
}
