//! Configuration module for Docsweep
//!
//! The crawler runs from compiled-in defaults; a TOML file may override any
//! subset of them. Loading always validates, so a `Config` obtained from this
//! module is safe to crawl with.
//!
//! # Example
//!
//! ```no_run
//! use docsweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("docsweep.toml")).unwrap();
//! println!("Crawl will stop after {} pages", config.crawl.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, ExtractionConfig, OutputConfig, UserAgentConfig, DEFAULT_SCOPE_PATTERN,
    DEFAULT_SEED_URL,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
