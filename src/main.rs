//! Playbill main entry point
//!
//! This is the command-line interface for the Playbill catalog crawler.

use anyhow::Context;
use clap::Parser;
use playbill::config::{load_config, validate, Config};
use playbill::crawler::{crawl, SearchClient};
use playbill::output::{CrawlProgress, CsvSink, RecordSink};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Playbill: a catalog crawler for dramatic works
///
/// Playbill searches a drama catalog with several filter sets, merges the
/// results, fetches every unique work page and writes one CSV row per work
/// (title, author, themes, periods, places, genres).
#[derive(Parser, Debug)]
#[command(name = "playbill")]
#[command(version)]
#[command(about = "A catalog crawler for dramatic works", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in catalog defaults when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Write CSV to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Maximum number of detail pages fetched at once
    #[arg(short = 'j', long, value_name = "N")]
    concurrency: Option<u32>,

    /// Never draw the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Validate config and show the searches that would run, without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config)
    } else {
        handle_crawl(&config, &cli).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries only CSV.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("playbill=info,warn"),
            1 => EnvFilter::new("playbill=debug,info"),
            2 => EnvFilter::new("playbill=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (or defaults) and applies CLI overrides
fn load(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?
        }
        None => {
            tracing::debug!("No configuration file given, using built-in catalog defaults");
            Config::default()
        }
    };

    if let Some(concurrency) = cli.concurrency {
        config.crawler.max_concurrent_fetches = concurrency;
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows what would be searched
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let search = SearchClient::new(client, &config.catalog, &config.selectors)?;

    println!("=== Playbill Dry Run ===\n");

    println!("Catalog: {}", config.catalog.base_url);
    println!(
        "Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("User agent: {}", config.user_agent.header_value());
    println!(
        "Values before a section header: {:?}",
        config.extractor.pre_header_values
    );

    println!("\nFilter Sets ({}):", config.filter_sets.len());
    for filter_set in &config.filter_sets {
        println!("  - {}", filter_set.name);
        for (key, value) in &filter_set.filters {
            println!("    * {} = {}", key, value);
        }
        println!("    GET {}", search.search_url(filter_set));
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, cli: &Cli) -> anyhow::Result<()> {
    let writer: Box<dyn Write + Send> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout()),
    };
    let mut sink = CsvSink::new(writer);
    let progress = CrawlProgress::new(!cli.no_progress && !cli.quiet);

    match crawl(config, &mut sink, &progress).await {
        Ok(report) => {
            tracing::info!(
                "Crawl completed: {} filter sets, {} hits, {} unique works, {} rows written",
                report.filter_sets,
                report.hits,
                report.tasks,
                report.emitted
            );
            Ok(())
        }
        Err(e) => {
            // Whatever was streamed already stays visible, but the run failed
            if let Err(flush_err) = sink.finish() {
                tracing::warn!("Failed to flush partial output: {}", flush_err);
            }
            tracing::error!(
                "Crawl failed after {} rows; output is incomplete",
                sink.rows()
            );
            Err(e).context("crawl failed")
        }
    }
}
