//! Frontier controller
//!
//! Owns the crawl state machine and everything a fold step touches:
//! - Seeding and deduplicating URLs
//! - Drawing capped batches, skipping pages already captured on disk
//! - Folding fetch results back: marking visited, persisting content,
//!   resolving and scope-filtering discovered links
//! - Deciding when the crawl is done

use crate::config::Config;
use crate::crawler::fetcher::PageResult;
use crate::output::{CrawlStatistics, PageWriter};
use crate::state::{FrontierState, VisitOutcome};
use crate::url::{canonicalize, resolve, CanonicalUrl, ScopeFilter};
use crate::SweepError;
use url::Url;

/// Crawl state plus the scope, writer and page cap it is driven by
pub struct Frontier {
    state: FrontierState,
    scope: ScopeFilter,
    writer: PageWriter,
    max_pages: usize,
    stats: CrawlStatistics,
}

impl Frontier {
    pub fn new(scope: ScopeFilter, writer: PageWriter, max_pages: usize) -> Self {
        Self {
            state: FrontierState::new(),
            scope,
            writer,
            max_pages,
            stats: CrawlStatistics::default(),
        }
    }

    /// Builds an empty frontier from the crawl and output settings
    pub fn from_config(config: &Config) -> Result<Self, SweepError> {
        let scope = ScopeFilter::new(&config.crawl.scope_pattern)?;
        let writer = PageWriter::from_config(&config.output);
        Ok(Self::new(scope, writer, config.crawl.max_pages))
    }

    /// Canonicalizes a raw URL and queues it unless already known
    ///
    /// Seeds bypass the scope filter. Returns true if the URL was newly queued.
    pub fn seed(&mut self, raw: &str) -> Result<bool, SweepError> {
        let url = canonicalize(raw)?;
        Ok(self.seed_canonical(url))
    }

    /// Queues an already-canonical URL unless already known
    pub fn seed_canonical(&mut self, url: CanonicalUrl) -> bool {
        self.state.enqueue(url)
    }

    /// Draws the next batch of at most `capacity` URLs to fetch
    ///
    /// URLs whose file already exists are marked visited on the spot and are
    /// not part of the batch. Skipped and dispatched URLs together never
    /// exceed what is left of the page cap. The order URLs are drawn in is
    /// unspecified.
    pub fn next_batch(&mut self, capacity: usize) -> Vec<CanonicalUrl> {
        let budget = self
            .max_pages
            .saturating_sub(self.state.visited_len() + self.state.in_flight_len());
        let writer = &self.writer;
        let drawn = self
            .state
            .draw_batch(capacity, budget, |url| writer.is_captured(url));

        for url in &drawn.skipped {
            tracing::info!("Skipping {} ({})", url, VisitOutcome::AlreadyCaptured);
        }
        self.stats.pages_already_captured += drawn.skipped.len() as u64;

        drawn.dispatch
    }

    /// Folds fetch results back into the frontier
    ///
    /// Results are matched to in-flight URLs by URL, never by position.
    /// A result for a URL that is not in flight is ignored.
    pub fn fold(&mut self, results: Vec<PageResult>) {
        for result in results {
            if !self.state.complete(result.url.as_str()) {
                tracing::warn!("Ignoring result for {} (not in flight)", result.url);
                continue;
            }

            match result.outcome {
                Err(failure) => {
                    self.stats.fetch_failures += 1;
                    tracing::warn!(
                        "Failed to fetch {} ({}): {}",
                        result.url,
                        VisitOutcome::FetchFailed,
                        failure
                    );
                }
                Ok(page) => {
                    self.stats.pages_fetched += 1;
                    tracing::info!("Fetched {} ({})", result.url, VisitOutcome::Fetched);
                    self.persist(&result.url, &page.content);
                    self.discover(&result.base_url, &page.links);
                }
            }
        }
    }

    /// Marks every URL still in flight as visited
    ///
    /// Used once a dispatched batch has fully resolved: anything left in
    /// flight got no result and must not stall the crawl.
    pub fn abandon_pending(&mut self) -> usize {
        let lost = self.state.complete_all_in_flight();
        for url in &lost {
            tracing::warn!("No fetch result for {} ({})", url, VisitOutcome::NoResult);
        }
        self.stats.missing_results += lost.len() as u64;
        lost.len()
    }

    /// Returns true when nothing is left to do or the page cap is reached
    ///
    /// Batches are drawn within the remaining cap, so the visited count
    /// never ends above it.
    pub fn is_done(&self) -> bool {
        self.state.is_drained() || self.cap_reached()
    }

    /// Returns true once the visited count has reached the page cap
    pub fn cap_reached(&self) -> bool {
        self.state.visited_len() >= self.max_pages
    }

    pub fn record_dispatch(&mut self) {
        self.stats.batches_dispatched += 1;
    }

    pub fn state(&self) -> &FrontierState {
        &self.state
    }

    pub fn scope(&self) -> &ScopeFilter {
        &self.scope
    }

    pub fn writer(&self) -> &PageWriter {
        &self.writer
    }

    /// Snapshot of the run's counters
    pub fn statistics(&self) -> CrawlStatistics {
        CrawlStatistics {
            pages_visited: self.state.visited_len() as u64,
            ..self.stats.clone()
        }
    }

    /// Writes fetched content; failures are logged and counted, never raised
    fn persist(&mut self, url: &CanonicalUrl, content: &str) {
        if content.trim().is_empty() {
            self.stats.pages_empty += 1;
            tracing::info!("No content extracted from {}, nothing written", url);
            return;
        }

        match self.writer.write(url, content) {
            Ok(path) => {
                self.stats.pages_written += 1;
                tracing::info!("Saved {} -> {}", url, path.display());
            }
            Err(e) => {
                self.stats.write_failures += 1;
                tracing::warn!("Failed to save {}: {}", url, e);
            }
        }
    }

    /// Resolves, scope-filters and queues the links found on a page
    fn discover(&mut self, base_url: &Url, links: &[String]) {
        for href in links {
            self.stats.links_discovered += 1;

            let url = match resolve(base_url, href) {
                Ok(url) => url,
                Err(e) => {
                    self.stats.links_unresolvable += 1;
                    tracing::debug!("Dropping link {:?} on {}: {}", href, base_url, e);
                    continue;
                }
            };

            if !self.scope.matches(&url) {
                self.stats.links_out_of_scope += 1;
                tracing::debug!("Out of scope: {}", url);
                continue;
            }

            if self.state.enqueue(url) {
                self.stats.links_enqueued += 1;
            }
        }
    }
}
