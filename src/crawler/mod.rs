//! Crawler module for document discovery and download
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with browser headers and encoding fallbacks
//! - HTML parsing and anchor classification
//! - Depth-bounded discovery of document links
//! - Validated document downloads
//! - Overall run coordination

mod coordinator;
mod discoverer;
mod downloader;
mod fetcher;
mod parser;

pub use coordinator::{CrawlRequest, CrawlSummary, Harvester, StartResponse, StatusReport};
pub use discoverer::{DiscoveredDocument, Discoverer, VisitedSet, DEFAULT_MAX_DEPTH};
pub use downloader::{original_file_name, DownloadOutcome, DownloadStatus, Downloader, PDF_MAGIC};
pub use fetcher::{build_http_client, decode_body, fetch_page, FetchResult};
pub use parser::{parse_html, resolve_link, CandidateLink, ParsedPage};

use crate::config::Config;
use crate::Result;

/// Runs a complete crawl and waits for it to finish
///
/// This is the blocking-style entry point for callers that do not poll. It will:
/// 1. Build a harvester from the configuration
/// 2. Start the crawl on a background task
/// 3. Wait for discovery and all downloads to complete
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - What the run discovered and saved
/// * `Err(HarvestError)` - The configuration or request was rejected
pub async fn crawl(config: Config, request: CrawlRequest) -> Result<CrawlSummary> {
    let harvester = Harvester::new(config)?;
    let handle = harvester.spawn_crawl(request)?;
    Ok(handle.await.unwrap_or_default())
}
