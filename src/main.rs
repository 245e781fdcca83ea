//! PDF Harvester main entry point
//!
//! This is the command-line driver for the harvester library.

use clap::Parser;
use pdf_harvester::config::{load_config_with_hash, Config};
use pdf_harvester::crawler::{CrawlRequest, Harvester};
use pdf_harvester::output::{format_progress_line, print_file_listing, print_status};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// PDF Harvester: collects dated PDF documents from a website
///
/// Starting from a seed page, the harvester follows links whose captions name
/// a document category, collects PDF links inside the requested year range and
/// downloads them under normalized names.
#[derive(Parser, Debug)]
#[command(name = "pdf-harvester")]
#[command(version = "1.0.0")]
#[command(about = "Collects dated PDF documents from a website", long_about = None)]
struct Cli {
    /// Page to start crawling from
    #[arg(value_name = "SEED_URL", required_unless_present = "list")]
    seed_url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory downloads are written to (defaults to the configured one)
    #[arg(short, long, value_name = "DIR")]
    dest: Option<PathBuf>,

    /// First year to include
    #[arg(long, requires = "end_year")]
    start_year: Option<i32>,

    /// Last year to include
    #[arg(long, requires = "start_year")]
    end_year: Option<i32>,

    /// Override the configured discovery depth
    #[arg(long)]
    max_depth: Option<u32>,

    /// List downloaded files and exit
    #[arg(long, conflicts_with = "seed_url")]
    list: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }

    let harvester = Harvester::new(config)?;

    if cli.list {
        handle_list(&harvester, cli.dest)?;
    } else if let Some(seed_url) = cli.seed_url {
        let request = CrawlRequest::new(seed_url, cli.dest.unwrap_or_default())
            .with_years(cli.start_year, cli.end_year);
        handle_crawl(&harvester, request, cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pdf_harvester=info,warn"),
            1 => EnvFilter::new("pdf_harvester=debug,info"),
            2 => EnvFilter::new("pdf_harvester=trace,debug"),
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

/// Handles --list: prints the files in the destination directory
fn handle_list(
    harvester: &Harvester,
    dest: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let files = harvester.list_downloaded_files(dest.as_deref())?;
    print_file_listing(&files);
    Ok(())
}

/// Handles the main crawl: starts it, polls progress once a second, prints the result
async fn handle_crawl(
    harvester: &Harvester,
    request: CrawlRequest,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let handle = match harvester.spawn_crawl(request) {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!("Crawl rejected: {}", e);
            return Err(e.into());
        }
    };

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    while !handle.is_finished() {
        ticker.tick().await;
        if !quiet {
            println!("{}", format_progress_line(&harvester.status().progress));
        }
    }

    let summary = handle.await?;
    tracing::info!(
        "Crawl completed: {} saved, {} skipped, {} failed",
        summary.saved.len(),
        summary.skipped,
        summary.failed
    );

    if !quiet {
        print_status(&harvester.status());
        println!();
        let destination = harvester.state().snapshot().destination;
        print_file_listing(&harvester.list_downloaded_files(destination.as_deref())?);
    }

    Ok(())
}
