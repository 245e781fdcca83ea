//! PDF Harvester: a depth-bounded document crawler
//!
//! This crate discovers PDF documents reachable from a seed page, filters them by
//! the year signal embedded in their URLs and link text, and downloads the ones
//! that look like real documents under normalized file names. A crawl runs in the
//! background and reports its progress through a pollable status snapshot.

pub mod config;
pub mod crawler;
pub mod heuristics;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("A crawl is already running")]
    AlreadyRunning,

    #[error("A seed URL is required")]
    EmptySeedUrl,

    #[error("Invalid year range: {start} > {end}")]
    InvalidYearRange { start: i32, end: i32 },

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlRequest, DownloadOutcome, Harvester, StartResponse, StatusReport};
pub use heuristics::{is_in_year_range, synthesize_file_name, YearRange};
pub use state::{Progress, RunSnapshot, RunState};
pub use storage::{list_downloaded_files, StoredFile};
