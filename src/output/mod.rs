//! Output module
//!
//! This module handles:
//! - Writing extracted page content to the output directory
//! - Recording and printing crawl statistics

pub mod stats;
mod writer;

pub use stats::{print_statistics, CrawlStatistics};
pub use writer::PageWriter;
