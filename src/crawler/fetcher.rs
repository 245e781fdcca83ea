//! HTTP fetcher implementation
//!
//! This module handles the page requests made during discovery, including:
//! - Building an HTTP client that presents itself as a desktop browser
//! - GET requests with a bounded timeout
//! - Decoding bodies served in UTF-8 or legacy Chinese encodings
//! - Error classification into a tagged result instead of raised errors

use crate::config::Config;
use encoding_rs::{GB18030, GBK};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;

/// Accept header sent when fetching HTML pages
pub const PAGE_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Accept header sent when fetching documents
pub const DOCUMENT_ACCEPT: &str = "application/pdf,*/*";

/// Result of a page fetch
#[derive(Debug)]
pub enum FetchResult {
    /// The page was fetched and decoded
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value (empty if absent)
        content_type: String,
        /// Decoded page body
        body: String,
        /// Name of the encoding that decoded the body
        encoding: &'static str,
    },

    /// The server answered with something other than 200
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, broken body, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// Every request carries the configured browser user agent and accept-language
/// header and is bounded by the configured timeout. Redirects are followed up to
/// ten hops.
///
/// # Example
///
/// ```no_run
/// use pdf_harvester::config::Config;
/// use pdf_harvester::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&config.http.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, value);
    }

    let timeout = Duration::from_secs(config.crawler.request_timeout_secs);

    Client::builder()
        .user_agent(config.http.user_agent.as_str())
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches an HTML page and decodes its body
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
///
/// # Returns
///
/// A FetchResult indicating success or the type of failure
pub async fn fetch_page(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).header(ACCEPT, PAGE_ACCEPT).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchResult::NetworkError {
                error: describe_error(&e),
            }
        }
    };

    let status = response.status();
    if status != StatusCode::OK {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    match response.bytes().await {
        Ok(bytes) => {
            let (body, encoding) = decode_body(&bytes);
            FetchResult::Success {
                final_url,
                status_code: status.as_u16(),
                content_type,
                body,
                encoding,
            }
        }
        Err(e) => FetchResult::NetworkError {
            error: describe_error(&e),
        },
    }
}

/// Decodes a response body, returning the text and the encoding that worked
///
/// Tries strict UTF-8, then strict GBK, then GB18030 with replacement characters.
/// The last step cannot fail, so every body decodes to something.
pub fn decode_body(bytes: &[u8]) -> (String, &'static str) {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return (text.to_string(), "UTF-8");
    }

    if let Some(text) = GBK.decode_without_bom_handling_and_without_replacement(bytes) {
        return (text.into_owned(), GBK.name());
    }

    let (text, _had_errors) = GB18030.decode_without_bom_handling(bytes);
    (text.into_owned(), GB18030.name())
}

/// Short description of a request error for the debug log
pub fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else {
        error.to_string()
    }
}
