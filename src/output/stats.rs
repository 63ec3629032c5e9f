//! Crawl statistics
//!
//! Counters updated by the frontier as batches are folded, and the summary
//! printed when a run finishes.

use std::time::Duration;

/// Counters describing one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// URLs that reached the visited set (the crawl's progress measure)
    pub pages_visited: u64,

    /// Pages fetched successfully
    pub pages_fetched: u64,

    /// Pages whose fetch failed
    pub fetch_failures: u64,

    /// Pages skipped because their file already existed
    pub pages_already_captured: u64,

    /// Pages written to disk in this run
    pub pages_written: u64,

    /// Fetched pages whose extracted content was empty (nothing written)
    pub pages_empty: u64,

    /// Pages whose content could not be written
    pub write_failures: u64,

    /// Dispatched URLs the fetcher returned no result for
    pub missing_results: u64,

    /// Links reported by fetched pages
    pub links_discovered: u64,

    /// Links that were newly queued
    pub links_enqueued: u64,

    /// Links discarded by the scope filter
    pub links_out_of_scope: u64,

    /// Links that could not be resolved to a crawlable URL
    pub links_unresolvable: u64,

    /// Batches handed to the fetcher
    pub batches_dispatched: u64,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Pages present on disk for this crawl: written now or captured earlier
    pub fn pages_on_disk(&self) -> u64 {
        self.pages_written + self.pages_already_captured
    }

    /// Share of fetch attempts that succeeded, in percent
    pub fn success_rate(&self) -> f64 {
        let attempts = self.pages_fetched + self.fetch_failures;
        if attempts == 0 {
            0.0
        } else {
            (self.pages_fetched as f64 / attempts as f64) * 100.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Pages:");
    println!("  Visited: {}", stats.pages_visited);
    println!("  Fetched: {}", stats.pages_fetched);
    println!("  Fetch failures: {}", stats.fetch_failures);
    println!("  Already captured (skipped): {}", stats.pages_already_captured);
    println!("  Written: {}", stats.pages_written);
    if stats.pages_empty > 0 {
        println!("  Empty content (not written): {}", stats.pages_empty);
    }
    if stats.write_failures > 0 {
        println!("  Write failures: {}", stats.write_failures);
    }
    if stats.missing_results > 0 {
        println!("  Missing fetch results: {}", stats.missing_results);
    }
    println!();

    println!("Links:");
    println!("  Discovered: {}", stats.links_discovered);
    println!("  Enqueued: {}", stats.links_enqueued);
    println!("  Out of scope: {}", stats.links_out_of_scope);
    println!("  Unresolvable: {}", stats.links_unresolvable);
    println!();

    println!(
        "Batches: {} in {:.1}s",
        stats.batches_dispatched,
        stats.elapsed.as_secs_f64()
    );
    println!(
        "Success Rate: {:.1}% ({} / {} fetches)",
        stats.success_rate(),
        stats.pages_fetched,
        stats.pages_fetched + stats.fetch_failures
    );
    println!("Pages on disk: {}", stats.pages_on_disk());
}
