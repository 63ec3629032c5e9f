//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the loop that drives the frontier:
//! - Validating configuration and preparing the output root
//! - Bootstrapping the crawl from the seed page
//! - Dispatching batches to the page fetcher and folding results back
//! - Stopping on the page cap, an empty frontier, or a stop request

use crate::config::{validate, Config};
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::frontier::Frontier;
use crate::output::CrawlStatistics;
use crate::url::{canonicalize, CanonicalUrl};
use crate::SweepError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Empty polls tolerated while URLs are still in flight before they are written off
const MAX_IDLE_POLLS: u32 = 20;

/// Cooperative stop signal, checked between batches
///
/// A batch already dispatched always runs to completion.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<F: PageFetcher> {
    config: Arc<Config>,
    frontier: Frontier,
    fetcher: F,
    seed: CanonicalUrl,
    stop: StopHandle,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(SweepError)` - Invalid configuration, unusable output root, or
    ///   the HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, SweepError> {
        validate(&config)?;
        let fetcher = HttpFetcher::new(&config)?;
        Self::build(config, fetcher)
    }
}

impl<F: PageFetcher> Coordinator<F> {
    /// Creates a coordinator around any page fetcher
    pub fn with_fetcher(config: Config, fetcher: F) -> Result<Self, SweepError> {
        validate(&config)?;
        Self::build(config, fetcher)
    }

    /// Prepares the output root and seeds the frontier from a validated config
    fn build(config: Config, fetcher: F) -> Result<Self, SweepError> {
        let mut frontier = Frontier::from_config(&config)?;
        frontier.writer().ensure_root()?;

        let seed = canonicalize(&config.crawl.seed_url)?;
        if !frontier.scope().matches(&seed) {
            tracing::warn!(
                "Seed {} does not match scope pattern '{}'; crawling it anyway",
                seed,
                frontier.scope().as_str()
            );
        }
        frontier.seed_canonical(seed.clone());

        Ok(Self {
            config: Arc::new(config),
            frontier,
            fetcher,
            seed,
            stop: StopHandle::default(),
        })
    }

    /// Returns a handle that stops the crawl after the current batch
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Runs the crawl until the frontier drains, the page cap is reached,
    /// or a stop is requested
    ///
    /// Per-page failures never end the run. The only runtime error is a seed
    /// page that could not be fetched.
    pub async fn run(&mut self) -> Result<CrawlStatistics, SweepError> {
        let start_time = Instant::now();
        let crawl = &self.config.crawl;
        tracing::info!(
            "Starting crawl from {} (scope '{}', max {} pages, {} concurrent)",
            self.seed,
            crawl.scope_pattern,
            crawl.max_pages,
            crawl.concurrency
        );
        tracing::info!("Writing pages under {}", self.frontier.writer().base_dir().display());

        self.bootstrap().await?;

        let concurrency = self.config.crawl.concurrency;
        let idle_poll = Duration::from_millis(self.config.crawl.idle_poll_ms);
        let mut idle_polls = 0;

        while !self.frontier.is_done() {
            if self.stop.is_stopped() {
                tracing::info!("Stop requested, ending crawl");
                break;
            }

            let batch = self.frontier.next_batch(concurrency);
            if batch.is_empty() {
                if self.frontier.state().in_flight_len() == 0 {
                    break;
                }

                idle_polls += 1;
                if idle_polls > MAX_IDLE_POLLS {
                    self.frontier.abandon_pending();
                    idle_polls = 0;
                } else {
                    tokio::time::sleep(idle_poll).await;
                }
                continue;
            }

            idle_polls = 0;
            self.dispatch(batch).await;

            let state = self.frontier.state();
            tracing::info!(
                "Progress: {} visited, {} queued, {:.2} pages/sec",
                state.visited_len(),
                state.to_visit_len(),
                state.visited_len() as f64 / start_time.elapsed().as_secs_f64().max(f64::EPSILON)
            );
        }

        if self.frontier.cap_reached() {
            tracing::info!("Reached page cap of {}", self.config.crawl.max_pages);
        } else if self.frontier.state().is_drained() {
            tracing::info!("Frontier is empty, crawl complete");
        }

        let mut stats = self.frontier.statistics();
        stats.elapsed = start_time.elapsed();
        tracing::info!(
            "Crawl finished: {} pages visited, {} written in {:.1}s",
            stats.pages_visited,
            stats.pages_written,
            stats.elapsed.as_secs_f64()
        );

        Ok(stats)
    }

    /// Dispatches the seed on its own and checks that it was reachable
    ///
    /// A seed already captured on disk is skipped like any other page; the
    /// crawl then only continues with whatever else is queued.
    async fn bootstrap(&mut self) -> Result<(), SweepError> {
        let batch = self.frontier.next_batch(1);
        if batch.is_empty() {
            tracing::info!("Seed {} already captured", self.seed);
            return Ok(());
        }

        self.frontier.record_dispatch();
        tracing::info!("Fetching seed {}", self.seed);
        let results = self
            .fetcher
            .fetch_batch(&batch, &self.config.extraction)
            .await;

        let seed_outcome = results
            .iter()
            .find(|r| r.url == self.seed)
            .map(|r| r.outcome.as_ref().map(|_| ()).map_err(|e| e.to_string()));

        match seed_outcome {
            Some(Ok(())) => {}
            Some(Err(reason)) => {
                return Err(SweepError::SeedUnreachable {
                    url: self.seed.to_string(),
                    reason,
                })
            }
            None => {
                return Err(SweepError::SeedUnreachable {
                    url: self.seed.to_string(),
                    reason: "fetcher returned no result".to_string(),
                })
            }
        }

        self.frontier.fold(results);
        self.frontier.abandon_pending();
        Ok(())
    }

    /// Fetches one batch and folds the results back
    async fn dispatch(&mut self, batch: Vec<CanonicalUrl>) {
        self.frontier.record_dispatch();
        tracing::info!("Fetching {} new pages...", batch.len());

        let results = self
            .fetcher
            .fetch_batch(&batch, &self.config.extraction)
            .await;

        self.frontier.fold(results);
        self.frontier.abandon_pending();
    }
}

/// Runs a complete crawl over HTTP with the given configuration
pub async fn run_crawl(config: Config) -> Result<CrawlStatistics, SweepError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
