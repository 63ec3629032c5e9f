//! Crawler module for page fetching and crawl orchestration
//!
//! This module contains the crawl engine, including:
//! - The page fetcher contract and its HTTP implementation
//! - HTML content and link extraction
//! - The frontier controller that owns crawl state
//! - The coordinator loop that drives batches to completion

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{run_crawl, Coordinator, StopHandle};
pub use fetcher::{build_http_client, FetchFailure, FetchedPage, HttpFetcher, PageFetcher, PageResult};
pub use frontier::Frontier;
pub use parser::{ExtractedPage, Extractor};
