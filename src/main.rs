//! Fringe-Sift main entry point
//!
//! This is the command-line interface for the Fringe-Sift event pipeline.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use fringe_sift::config::{load_config_with_hash, Config};
use fringe_sift::crawler::{
    day_listing_url, listing_url, run_pipeline, user_agent_string, Phase,
};
use fringe_sift::output::{load_snapshot_summary, print_snapshot_summary, print_statistics};
use fringe_sift::schedule::date_range;
use fringe_sift::storage::open_storage;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Fringe-Sift: festival event schedule scraper and reconciler
///
/// Fringe-Sift scrapes every event page of a festival ticketing site,
/// crawls the site's per-day listings to verify when each show actually
/// runs, and writes a deduplicated, reconciled event dataset.
#[derive(Parser, Debug)]
#[command(name = "fringe-sift")]
#[command(version)]
#[command(about = "Festival event schedule scraper and reconciler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Pipeline phase to run
    #[arg(long, value_enum, default_value_t = PhaseArg::All)]
    phase: PhaseArg,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the planned requests without fetching anything
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Summarize the existing snapshots and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PhaseArg {
    /// Discover and scrape event pages
    Scrape,
    /// Crawl the per-day listings
    Verify,
    /// Deduplicate and reconcile the saved records
    Reconcile,
    /// Run every phase in sequence
    All,
}

impl From<PhaseArg> for Phase {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::Scrape => Phase::Scrape,
            PhaseArg::Verify => Phase::Verify,
            PhaseArg::Reconcile => Phase::Reconcile,
            PhaseArg::All => Phase::All,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config, cli.phase.into())
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_run(config, cli.phase.into()).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("fringe_sift=info,warn"),
            1 => EnvFilter::new("fringe_sift=debug,info"),
            2 => EnvFilter::new("fringe_sift=trace,debug"),
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

/// Handles the --dry-run mode: shows the resolved configuration and planned requests
fn handle_dry_run(config: &Config, phase: Phase) -> anyhow::Result<()> {
    println!("=== Fringe-Sift Dry Run ===\n");

    let base_url = Url::parse(&config.site.base_url).context("Invalid base URL")?;
    let listing = listing_url(&base_url, &config.site.listing_path)?;

    println!("Site:");
    println!("  Base URL: {}", base_url);
    println!("  Listing: {}", listing);

    println!("\nCrawler Configuration:");
    println!(
        "  Navigation timeout: {}ms",
        config.crawler.navigation_timeout_ms
    );
    println!("  Connect timeout: {}ms", config.crawler.connect_timeout_ms);
    println!(
        "  Checkpoint every: {} records",
        config.crawler.checkpoint_interval
    );
    println!(
        "  Retries: {} (delay {}ms)",
        config.crawler.max_retries, config.crawler.retry_delay_ms
    );
    println!("  Respect robots.txt: {}", config.crawler.respect_robots);

    println!("\nUser Agent:");
    println!("  {}", user_agent_string(&config.user_agent));

    println!("\nOutput:");
    println!("  Raw events: {}", config.output.events_path);
    println!("  Verified schedule: {}", config.output.verified_path);
    println!("  Canonical events: {}", config.output.canonical_path);
    if let Some(palette) = &config.output.palette_path {
        println!("  Venue palette: {}", palette);
    }

    println!("\nPhase: {:?}", phase);

    if matches!(phase, Phase::Scrape | Phase::All) {
        println!("\nScrape:");
        println!("  GET {}", listing);
        match &config.input.priority_path {
            Some(path) => println!("  Priority list: {}", path),
            None => println!("  Priority list: none (discovery order)"),
        }
    }

    if matches!(phase, Phase::Verify | Phase::All) {
        let days: Vec<_> = date_range(
            config.verification.start_date,
            config.verification.end_date,
        )
        .collect();
        println!(
            "\nVerification ({} days, {}ms apart):",
            days.len(),
            config.verification.request_delay_ms
        );
        for date in days {
            println!("  GET {}", day_listing_url(&listing, date));
        }
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: summarizes the snapshots on disk
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let storage = open_storage(&config.output);
    let summary = load_snapshot_summary(&storage).context("Failed to read snapshots")?;
    print_snapshot_summary(&summary);

    println!("\nFiles:");
    println!("  Raw events: {}", storage.events_path().display());
    println!("  Verified schedule: {}", storage.verified_path().display());
    println!("  Canonical events: {}", storage.canonical_path().display());

    Ok(())
}

/// Handles the pipeline run
async fn handle_run(config: Config, phase: Phase) -> anyhow::Result<()> {
    tracing::info!(
        "Running {:?} against {} ({} to {})",
        phase,
        config.site.base_url,
        config.verification.start_date,
        config.verification.end_date
    );

    match run_pipeline(config, phase).await {
        Ok(stats) => {
            tracing::info!("Run completed successfully");
            print_statistics(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e).context("Pipeline run failed")
        }
    }
}
