//! HTML extraction for fetched pages
//!
//! This module turns a fetched HTML document into:
//! - Readable Markdown content from the configured content regions
//! - The links to consider for crawling
//! - The page title

use crate::config::ExtractionConfig;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements that never carry readable content
const ALWAYS_REMOVED: &[&str] = &["script", "style", "noscript", "template"];

/// Selectors for modals, popups and consent banners
const OVERLAY_SELECTORS: &[&str] = &[
    "[role=\"dialog\"]",
    "[aria-modal=\"true\"]",
    "[class*=\"modal\"]",
    "[class*=\"popup\"]",
    "[class*=\"overlay\"]",
    "[class*=\"cookie\"]",
    "[id*=\"modal\"]",
    "[id*=\"popup\"]",
    "[id*=\"overlay\"]",
    "[id*=\"cookie\"]",
];

/// Link prefixes that never lead to a page
const SKIPPED_LINK_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ExtractedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Markdown rendering of the content regions, trimmed
    pub content: String,

    /// Raw hrefs of the links worth following, in document order, deduplicated
    pub links: Vec<String>,
}

/// Compiled form of an [`ExtractionConfig`]
#[derive(Debug)]
pub struct Extractor {
    body: Selector,
    content: Vec<Selector>,
    removed: Vec<Selector>,
    same_site_only: bool,
}

impl Extractor {
    /// Compiles the selectors of an extraction configuration
    pub fn new(config: &ExtractionConfig) -> Result<Self, ConfigError> {
        let content = config
            .content_selectors
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>, _>>()?;

        let mut removed_sources: Vec<&str> = ALWAYS_REMOVED.to_vec();
        removed_sources.extend(config.excluded_tags.iter().map(String::as_str));
        if config.remove_overlay_elements {
            removed_sources.extend_from_slice(OVERLAY_SELECTORS);
        }

        let removed = removed_sources
            .into_iter()
            .map(parse_selector)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            body: parse_selector("body")?,
            content,
            removed,
            same_site_only: config.same_site_links_only,
        })
    }

    /// Extracts content, links and title from an HTML document
    ///
    /// # Content Rules
    ///
    /// - With no content selectors configured, the whole `<body>` is used
    /// - Otherwise every element matching a selector is used, outermost
    ///   matches only, in document order; a page with no match has no content
    /// - Excluded tags, `script`/`style`/`noscript`/`template` and (when
    ///   enabled) overlay elements are removed before conversion
    ///
    /// # Link Rules
    ///
    /// Links come from every `<a href>` in the document, not just the content
    /// regions. Excluded: `download` links, fragment-only links,
    /// `javascript:`/`mailto:`/`tel:`/`data:` links, hrefs that do not
    /// resolve to HTTP(S), and (when same-site only) hrefs resolving to a
    /// different host than `base_url`.
    ///
    /// # Example
    ///
    /// ```
    /// use docsweep::config::ExtractionConfig;
    /// use docsweep::crawler::Extractor;
    /// use url::Url;
    ///
    /// let html = r#"<html><body><nav><a href="/docs/b">B</a></nav>
    ///     <article><h1>Title</h1><p>Body text</p></article></body></html>"#;
    /// let extractor = Extractor::new(&ExtractionConfig::default()).unwrap();
    /// let page = extractor.extract(html, &Url::parse("https://h/docs/a").unwrap());
    /// assert!(page.content.contains("Body text"));
    /// assert_eq!(page.links, vec!["/docs/b".to_string()]);
    /// ```
    pub fn extract(&self, html: &str, base_url: &Url) -> ExtractedPage {
        let document = Html::parse_document(html);

        ExtractedPage {
            title: extract_title(&document),
            content: self.extract_content(&document),
            links: self.extract_links(&document, base_url),
        }
    }

    /// Renders the content regions of the document as Markdown
    fn extract_content(&self, document: &Html) -> String {
        let regions = self.content_regions(document);

        let html: Vec<String> = regions
            .into_iter()
            .filter(|region| !self.is_removed(region))
            .map(|region| self.strip_removed(region))
            .collect();

        if html.is_empty() {
            return String::new();
        }

        html2md::parse_html(&html.join("\n")).trim().to_string()
    }

    /// Selects the outermost elements matching any content selector
    fn content_regions<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        if self.content.is_empty() {
            return document.select(&self.body).take(1).collect();
        }

        let mut matched = HashSet::new();
        for selector in &self.content {
            for element in document.select(selector) {
                matched.insert(element.id());
            }
        }

        document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|element| matched.contains(&element.id()))
            .filter(|element| {
                !element
                    .ancestors()
                    .any(|ancestor| matched.contains(&ancestor.id()))
            })
            .collect()
    }

    fn is_removed(&self, element: &ElementRef) -> bool {
        self.removed.iter().any(|selector| selector.matches(element))
    }

    /// Serializes a region with every removable descendant cut out
    fn strip_removed(&self, region: ElementRef) -> String {
        let mut html = region.html();

        for selector in &self.removed {
            for element in region.select(selector) {
                if element.id() == region.id() {
                    continue;
                }
                // Already gone if an enclosing element was removed first
                html = html.replacen(&element.html(), "", 1);
            }
        }

        html
    }

    /// Collects followable hrefs from the whole document
    fn extract_links(&self, document: &Html, base_url: &Url) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        let a_selector = match Selector::parse("a[href]") {
            Ok(selector) => selector,
            Err(_) => return links,
        };

        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            let href = match element.value().attr("href") {
                Some(href) => href.trim(),
                None => continue,
            };

            if self.is_followable(href, base_url) && seen.insert(href.to_string()) {
                links.push(href.to_string());
            }
        }

        links
    }

    fn is_followable(&self, href: &str, base_url: &Url) -> bool {
        if href.is_empty() || href.starts_with('#') {
            return false;
        }

        let lowered = href.to_ascii_lowercase();
        if SKIPPED_LINK_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
            return false;
        }

        match base_url.join(href) {
            Ok(absolute) => {
                if absolute.scheme() != "http" && absolute.scheme() != "https" {
                    return false;
                }
                !self.same_site_only || absolute.host_str() == base_url.host_str()
            }
            Err(_) => false,
        }
    }
}

fn parse_selector(source: &str) -> Result<Selector, ConfigError> {
    Selector::parse(source)
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", source, e)))
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}
