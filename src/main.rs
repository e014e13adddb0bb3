//! bidfta-scraper - Concurrent BidFTA auction listing scraper
//!
//! Searches BidFTA for each term and prints (or saves) the listings found.

use anyhow::Result;
use bidfta_scraper::commands::ScrapeCommand;
use bidfta_scraper::config::{Config, FetchMode, RowPolicy};
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bidfta-scraper",
    version,
    about = "Scrape BidFTA auction listings for a set of search terms",
    long_about = "Fetches the first results page for each search term from bidfta.com, \
                  extracts the embedded listing data, and prints a summary table. \
                  Use --output to save every column as CSV."
)]
struct Cli {
    /// Search terms to look up
    #[arg(required = true)]
    terms: Vec<String>,

    /// BidFTA location ID
    #[arg(short, long, env = "BIDFTA_LOCATION")]
    location: Option<String>,

    /// Pacing delay per request in milliseconds
    #[arg(long, env = "BIDFTA_DELAY")]
    delay: Option<u64>,

    /// Maximum concurrent requests
    #[arg(short = 'j', long, env = "BIDFTA_MAX_CONCURRENT")]
    max_concurrent: Option<usize>,

    /// Scheduling mode: sequential or concurrent
    #[arg(short, long, env = "BIDFTA_MODE")]
    mode: Option<FetchMode>,

    /// Shorthand for --mode sequential
    #[arg(long, conflicts_with = "mode")]
    sequential: bool,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, env = "BIDFTA_PROXY")]
    proxy: Option<String>,

    /// Drop rows with malformed timestamps instead of failing
    #[arg(long)]
    skip_invalid: bool,

    /// Save the full result table to this CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else if cli.quiet {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    // Logs on stderr, results on stdout
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(location) = cli.location {
        config.location_id = location;
    }
    if let Some(delay) = cli.delay {
        config.request_delay_ms = Some(delay);
    }
    if let Some(max) = cli.max_concurrent {
        config.max_concurrent_requests = max;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if cli.sequential {
        config.mode = FetchMode::Sequential;
    }
    if cli.skip_invalid {
        config.on_invalid_row = RowPolicy::Skip;
    }

    let cmd = ScrapeCommand::new(config);
    let output = cmd.execute(&cli.terms, cli.output.as_deref()).await?;
    println!("{}", output);

    Ok(())
}
