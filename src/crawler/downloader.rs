//! Document download and validation
//!
//! Links that end in `.pdf` are not always PDFs: portals answer with login
//! pages, error pages and zero-byte placeholders. Before anything is written
//! the downloader checks the status code, the declared content type, and for
//! suspiciously small responses the `%PDF` signature at the start of the body.

use crate::crawler::discoverer::DiscoveredDocument;
use crate::crawler::fetcher::DOCUMENT_ACCEPT;
use crate::heuristics::{decode_percent, synthesize_file_name, DOCUMENT_EXTENSION};
use crate::state::RunGuard;
use crate::HarvestError;
use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Signature every PDF file starts with
pub const PDF_MAGIC: &[u8] = b"%PDF";

/// Result of one download attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The document was written to the destination directory
    Saved {
        /// Name the document was stored under
        file_name: String,
        /// Number of bytes written
        bytes: u64,
    },

    /// The response was not a document worth keeping
    Skipped { reason: String },

    /// A network or filesystem error interrupted the attempt
    Failed { reason: String },
}

/// Coarse classification of a [`DownloadOutcome`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    Success,
    Skipped,
    Failed,
}

impl DownloadOutcome {
    pub fn status(&self) -> DownloadStatus {
        match self {
            Self::Saved { .. } => DownloadStatus::Success,
            Self::Skipped { .. } => DownloadStatus::Skipped,
            Self::Failed { .. } => DownloadStatus::Failed,
        }
    }

    /// The stored file name, if the document was saved
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::Saved { file_name, .. } => Some(file_name),
            _ => None,
        }
    }

    /// Why the document was not saved
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Saved { .. } => None,
            Self::Skipped { reason } | Self::Failed { reason } => Some(reason),
        }
    }
}

/// Downloads discovered documents into a directory
pub struct Downloader<'a> {
    client: &'a Client,
    run: &'a RunGuard,
    min_document_bytes: u64,
}

impl<'a> Downloader<'a> {
    pub fn new(client: &'a Client, run: &'a RunGuard, min_document_bytes: u64) -> Self {
        Self {
            client,
            run,
            min_document_bytes,
        }
    }

    /// Downloads one document into `destination`
    ///
    /// # Flow
    ///
    /// 1. GET the URL; anything but 200 is skipped
    /// 2. Take the original name from the last path segment; a name without
    ///    `.pdf` is only accepted when the response declares `application/pdf`
    /// 3. Synthesize the stored name from the URL, original name and link caption
    /// 4. If the declared length is below the threshold, require the `%PDF` signature
    /// 5. Stream the body to disk, replacing any file of the same name
    ///
    /// Errors never escape: they come back as [`DownloadOutcome::Failed`] and
    /// any partially written file is removed.
    pub async fn download(
        &self,
        document: &DiscoveredDocument,
        destination: &Path,
    ) -> DownloadOutcome {
        self.run.log(format!("Attempting download: {}", document.url));

        let outcome = match self.try_download(document, destination).await {
            Ok(outcome) => outcome,
            Err(e) => DownloadOutcome::Failed {
                reason: e.to_string(),
            },
        };

        match &outcome {
            DownloadOutcome::Saved { file_name, bytes } => {
                tracing::info!("Saved {} ({} bytes)", file_name, bytes);
                self.run.log(format!("Downloaded: {}", file_name));
            }
            DownloadOutcome::Skipped { reason } => {
                self.run
                    .log(format!("Skipped {}: {}", document.url, reason));
            }
            DownloadOutcome::Failed { reason } => {
                tracing::warn!("Download of {} failed: {}", document.url, reason);
                self.run.log(format!(
                    "Error during download: {}, URL: {}",
                    reason, document.url
                ));
            }
        }

        outcome
    }

    async fn try_download(
        &self,
        document: &DiscoveredDocument,
        destination: &Path,
    ) -> Result<DownloadOutcome, HarvestError> {
        let url = document.url.as_str();
        let mut response = self
            .client
            .get(url)
            .header(ACCEPT, DOCUMENT_ACCEPT)
            .send()
            .await
            .map_err(|source| HarvestError::Http {
                url: url.to_string(),
                source,
            })?;

        let content_type = header_value(&response, CONTENT_TYPE).unwrap_or_default();
        self.run.log(format!("Content-Type: {}", content_type));

        let status = response.status();
        if status != StatusCode::OK {
            return Ok(DownloadOutcome::Skipped {
                reason: format!("HTTP status {}", status.as_u16()),
            });
        }

        let mut original_name = original_file_name(url);
        if !original_name.to_lowercase().ends_with(DOCUMENT_EXTENSION) {
            if !content_type.to_lowercase().contains("application/pdf") {
                return Ok(DownloadOutcome::Skipped {
                    reason: format!("not a PDF (Content-Type: {})", content_type),
                });
            }
            original_name.push_str(DOCUMENT_EXTENSION);
        }

        let file_name = synthesize_file_name(url, &original_name, Some(&document.link_text));
        self.run.log(format!("Will be saved as: {}", file_name));

        let declared_length = header_value(&response, CONTENT_LENGTH)
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(0);
        self.run
            .log(format!("Content length: {} bytes", declared_length));

        let mut head = Vec::new();
        if declared_length < self.min_document_bytes {
            self.run.log(format!(
                "Declared size {} is below {} bytes, checking signature",
                declared_length, self.min_document_bytes
            ));
            while head.len() < PDF_MAGIC.len() {
                match response.chunk().await.map_err(|e| HarvestError::Http {
                    url: url.to_string(),
                    source: e,
                })? {
                    Some(chunk) => head.extend_from_slice(&chunk),
                    None => break,
                }
            }
            if !head.starts_with(PDF_MAGIC) {
                return Ok(DownloadOutcome::Skipped {
                    reason: "content does not start with the PDF signature".to_string(),
                });
            }
        }

        let path = destination.join(&file_name);
        match write_body(&path, &head, &mut response).await {
            Ok(bytes) => Ok(DownloadOutcome::Saved { file_name, bytes }),
            Err(e) => {
                let _ = tokio::fs::remove_file(&path).await;
                Err(e)
            }
        }
    }
}

/// Streams the already-read prefix and the rest of the body into `path`
async fn write_body(path: &Path, head: &[u8], response: &mut Response) -> Result<u64, HarvestError> {
    let mut file = File::create(path).await?;
    file.write_all(head).await?;
    let mut written = head.len() as u64;

    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

fn header_value(response: &Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Last path segment of a URL, percent-decoded and safe to use as a file name
pub fn original_file_name(url: &str) -> String {
    let segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string))
            .unwrap_or_default(),
        Err(_) => url.rsplit('/').next().unwrap_or_default().to_string(),
    };

    let decoded = decode_percent(&segment).replace(['/', '\\'], "_");

    match decoded.trim() {
        "" | "." | ".." => "document".to_string(),
        name => name.to_string(),
    }
}
