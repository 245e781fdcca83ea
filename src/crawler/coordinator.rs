//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the run lifecycle that ties the pipeline together:
//! - Validating a crawl request and rejecting it while another run is active
//! - Spawning the run on a background task so the caller never waits on it
//! - Sequencing discovery, then downloads in discovery order
//! - Publishing progress and the debug log through [`RunState`]
//! - Answering status and file listing queries

use crate::config::{validate, Config};
use crate::crawler::discoverer::Discoverer;
use crate::crawler::downloader::{original_file_name, DownloadOutcome, Downloader};
use crate::crawler::fetcher::build_http_client;
use crate::heuristics::YearRange;
use crate::state::{Progress, RunGuard, RunState};
use crate::storage::{self, StoredFile};
use crate::{HarvestError, Result};
use reqwest::Client;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use url::Url;

/// Parameters of one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    /// Page the crawl starts from
    pub seed_url: String,

    /// Directory documents are written to; empty means the configured default
    pub destination: PathBuf,

    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

impl CrawlRequest {
    pub fn new(seed_url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            seed_url: seed_url.into(),
            destination: destination.into(),
            start_year: None,
            end_year: None,
        }
    }

    /// Restricts the crawl to documents dated inside `start..=end`
    pub fn with_years(mut self, start: Option<i32>, end: Option<i32>) -> Self {
        self.start_year = start;
        self.end_year = end;
        self
    }

    pub fn year_range(&self) -> YearRange {
        YearRange::new(self.start_year, self.end_year)
    }
}

/// Answer to a start request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartResponse {
    pub accepted: bool,
    pub message: String,
}

/// Status of the harvester as seen by a polling caller
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub running: bool,
    pub last_run: Option<String>,
    /// Files currently in the run's destination directory
    pub file_count: usize,
    pub debug_log: Vec<String>,
    pub progress: Progress,
}

/// What a finished run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Documents discovery produced
    pub discovered: usize,
    /// Names of the documents written, in download order
    pub saved: Vec<String>,
    pub skipped: usize,
    pub failed: usize,
}

/// Entry point for running crawls and inspecting their results
///
/// A harvester owns the HTTP client and the process-wide [`RunState`]. Cloning
/// it is cheap and every clone shares the same state, so at most one crawl runs
/// across all clones.
#[derive(Debug, Clone)]
pub struct Harvester {
    config: Arc<Config>,
    client: Client,
    state: Arc<RunState>,
}

impl Harvester {
    /// Creates a harvester from a configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to accept crawls
    /// * `Err(HarvestError)` - The configuration is invalid or the HTTP client could not be built
    pub fn new(config: Config) -> Result<Self> {
        validate(&config)?;
        let client = build_http_client(&config)?;
        let state = Arc::new(RunState::new(config.crawler.debug_log_capacity));

        Ok(Self {
            config: Arc::new(config),
            client,
            state,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &Arc<RunState> {
        &self.state
    }

    /// Starts a crawl in the background and reports whether it was accepted
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_crawl(&self, request: CrawlRequest) -> StartResponse {
        match self.spawn_crawl(request) {
            Ok(_) => StartResponse {
                accepted: true,
                message: "Crawl started".to_string(),
            },
            Err(e) => StartResponse {
                accepted: false,
                message: e.to_string(),
            },
        }
    }

    /// Starts a crawl in the background
    ///
    /// The request is validated and the run state claimed before this returns;
    /// the crawl itself runs on a spawned task whose handle resolves to the
    /// run's summary.
    ///
    /// # Errors
    ///
    /// * `HarvestError::AlreadyRunning` - Another crawl is active
    /// * `HarvestError::EmptySeedUrl` - No seed URL was given
    /// * `HarvestError::UrlParse` - The seed URL is not an absolute URL
    /// * `HarvestError::InvalidYearRange` - The start year is after the end year
    ///
    /// A rejected request leaves the run state untouched.
    pub fn spawn_crawl(&self, request: CrawlRequest) -> Result<JoinHandle<CrawlSummary>> {
        let request = self.prepare(request)?;
        let run = self.state.begin(request.destination.clone())?;

        let harvester = self.clone();
        Ok(tokio::spawn(async move { harvester.run(request, run).await }))
    }

    /// Returns the current status
    pub fn status(&self) -> StatusReport {
        let snapshot = self.state.snapshot();
        let directory = snapshot
            .destination
            .clone()
            .unwrap_or_else(|| self.default_destination());

        StatusReport {
            running: snapshot.running,
            last_run: snapshot.last_run,
            file_count: storage::count_files(&directory),
            debug_log: snapshot.debug_log,
            progress: snapshot.progress,
        }
    }

    /// Lists downloaded files, newest first
    ///
    /// `None` lists the configured default directory.
    pub fn list_downloaded_files(&self, destination: Option<&Path>) -> Result<Vec<StoredFile>> {
        match destination {
            Some(directory) => storage::list_downloaded_files(directory),
            None => storage::list_downloaded_files(&self.default_destination()),
        }
    }

    /// Opens a downloaded file by name for streaming back to a caller
    pub fn open_downloaded_file(&self, destination: Option<&Path>, name: &str) -> Result<File> {
        match destination {
            Some(directory) => storage::open_file(directory, name),
            None => storage::open_file(&self.default_destination(), name),
        }
    }

    fn default_destination(&self) -> PathBuf {
        PathBuf::from(&self.config.output.download_dir)
    }

    /// Checks a request and fills in defaults; mutates nothing
    fn prepare(&self, mut request: CrawlRequest) -> Result<CrawlRequest> {
        if self.state.is_running() {
            return Err(HarvestError::AlreadyRunning);
        }

        request.seed_url = request.seed_url.trim().to_string();
        if request.seed_url.is_empty() {
            return Err(HarvestError::EmptySeedUrl);
        }
        Url::parse(&request.seed_url)?;

        if let (Some(start), Some(end)) = (request.start_year, request.end_year) {
            if start > end {
                return Err(HarvestError::InvalidYearRange { start, end });
            }
        }

        if request.destination.as_os_str().is_empty() {
            request.destination = self.default_destination();
        }

        Ok(request)
    }

    /// Body of the background task; `run` is dropped on exit, ending the run
    async fn run(&self, request: CrawlRequest, run: RunGuard) -> CrawlSummary {
        match self.execute(&request, &run).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!("Crawl of {} failed: {}", request.seed_url, e);
                run.log(format!("Error during crawl: {}", e));
                CrawlSummary::default()
            }
        }
    }

    async fn execute(&self, request: &CrawlRequest, run: &RunGuard) -> Result<CrawlSummary> {
        let destination = &request.destination;
        tracing::info!("Starting crawl of {}", request.seed_url);
        run.log(format!("Starting PDF crawl of: {}", request.seed_url));
        run.log(format!("Download directory: {}", destination.display()));
        run.log(format!(
            "Year range: {} - {}",
            format_year(request.start_year),
            format_year(request.end_year)
        ));

        if storage::ensure_dir(destination)? {
            run.log(format!("Created download directory: {}", destination.display()));
        }

        let discoverer = Discoverer::new(
            &self.client,
            run,
            request.year_range(),
            self.config.crawler.max_depth,
        );
        let documents = discoverer.discover(&request.seed_url).await;

        run.log(format!("Found {} PDF links", documents.len()));
        run.set_total(documents.len());
        for (index, document) in documents.iter().enumerate() {
            run.log(format!("Link {}: {}", index + 1, document.url));
        }

        let downloader = Downloader::new(&self.client, run, self.config.crawler.min_document_bytes);
        let mut summary = CrawlSummary {
            discovered: documents.len(),
            ..CrawlSummary::default()
        };

        for document in &documents {
            run.begin_item(&original_file_name(&document.url));

            let outcome = downloader.download(document, destination).await;
            match &outcome {
                DownloadOutcome::Saved { file_name, .. } => summary.saved.push(file_name.clone()),
                DownloadOutcome::Skipped { .. } => summary.skipped += 1,
                DownloadOutcome::Failed { .. } => summary.failed += 1,
            }
            run.complete_item(outcome.file_name());
        }

        run.log(format!(
            "Crawl complete, downloaded {} files",
            summary.saved.len()
        ));
        run.finish();

        tracing::info!(
            "Crawl finished: {} discovered, {} saved, {} skipped, {} failed",
            summary.discovered,
            summary.saved.len(),
            summary.skipped,
            summary.failed
        );

        Ok(summary)
    }
}

fn format_year(year: Option<i32>) -> String {
    year.map(|y| y.to_string())
        .unwrap_or_else(|| "any".to_string())
}
