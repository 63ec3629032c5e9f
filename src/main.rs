//! docsweep main entry point
//!
//! This is the command-line interface for the docsweep documentation crawler.

use anyhow::Context;
use clap::Parser;
use docsweep::config::{load_config_with_hash, validate, Config};
use docsweep::crawler::Coordinator;
use docsweep::output::print_statistics;
use docsweep::url::canonicalize;
use docsweep::PageWriter;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// docsweep: an incremental documentation crawler
///
/// docsweep crawls a documentation site from a seed page, following links
/// that match a scope pattern, and saves each page as a Markdown file.
/// Pages already on disk are skipped, so an interrupted crawl resumes by
/// running it again.
#[derive(Parser, Debug)]
#[command(name = "docsweep")]
#[command(version)]
#[command(about = "An incremental documentation crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            let config = Config::default();
            validate(&config).context("Built-in configuration is invalid")?;
            config
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)
    } else {
        handle_crawl(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("docsweep=info,warn"),
            1 => EnvFilter::new("docsweep=debug,info"),
            2 => EnvFilter::new("docsweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== docsweep Dry Run ===\n");

    println!("Crawl:");
    println!("  Seed: {}", config.crawl.seed_url);
    println!("  Scope pattern: {}", config.crawl.scope_pattern);
    println!("  Max pages: {}", config.crawl.max_pages);
    println!("  Concurrency: {}", config.crawl.concurrency);
    println!("  Request timeout: {}s", config.crawl.request_timeout_secs);

    println!("\nExtraction:");
    println!("  Content selectors: {}", config.extraction.content_selectors.join(", "));
    println!("  Excluded tags: {}", config.extraction.excluded_tags.join(", "));
    println!("  Remove overlays: {}", config.extraction.remove_overlay_elements);
    println!("  Same-site links only: {}", config.extraction.same_site_links_only);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    let writer = PageWriter::from_config(&config.output);
    let seed = canonicalize(&config.crawl.seed_url)?;
    println!("\nOutput:");
    println!("  Directory: {}", writer.base_dir().display());
    println!("  Seed file: {}", writer.path_for(&seed).display());

    println!("\n✓ Configuration is valid");
    if writer.is_captured(&seed) {
        println!("✓ Seed already captured at {}; a run would skip it", writer.path_for(&seed).display());
    } else {
        println!("✓ Would start crawling from {}", seed);
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let mut coordinator = Coordinator::new(config)?;

    let stop = coordinator.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing current batch");
            stop.stop();
        }
    });

    match coordinator.run().await {
        Ok(stats) => {
            tracing::info!("Crawl completed successfully");
            println!();
            print_statistics(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
