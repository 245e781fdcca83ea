use crate::crawler::DEFAULT_MAX_DEPTH;
use serde::Deserialize;

/// Browser user agent presented to document portals, many of which refuse
/// obvious bot identifiers.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";

/// Main configuration structure for the harvester
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of page-follow hops from the seed
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Timeout applied to every request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Declared sizes below this trigger a magic-byte sniff
    #[serde(rename = "min-document-bytes")]
    pub min_document_bytes: u64,

    /// Number of trace lines kept in the debug log
    #[serde(rename = "debug-log-capacity")]
    pub debug_log_capacity: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            request_timeout_secs: 30,
            min_document_bytes: 1000,
            debug_log_capacity: 100,
        }
    }
}

/// Request header configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Destination used when a crawl request leaves it empty
    #[serde(rename = "download-dir")]
    pub download_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            download_dir: "downloads".to_string(),
        }
    }
}
