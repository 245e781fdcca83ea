//! Link discovery
//!
//! Portals bury their documents behind category listing pages, so scanning the
//! seed page alone finds little. The discoverer walks outward from the seed,
//! descending only into pages whose link caption names a document category,
//! and collects every PDF link that passes the year filter on the way.
//!
//! The walk is a depth-first traversal driven by an explicit stack. Pages are
//! visited in the same order a recursive walk would visit them, but raising the
//! depth limit never grows the call stack.

use crate::crawler::fetcher::{fetch_page, FetchResult};
use crate::crawler::parser::{parse_html, CandidateLink};
use crate::heuristics::YearRange;
use crate::state::RunGuard;
use reqwest::Client;
use std::collections::HashSet;
use url::Url;

/// Default number of page-follow hops from the seed
pub const DEFAULT_MAX_DEPTH: u32 = 3;

/// URLs fetched during one crawl, keyed by their raw absolute form
pub type VisitedSet = HashSet<String>;

/// A document link accepted by discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDocument {
    /// Absolute URL of the document
    pub url: String,

    /// Caption of the anchor that pointed at it
    pub link_text: String,
}

/// What one page contributed to the walk
#[derive(Debug, Default)]
struct PageScan {
    documents: Vec<DiscoveredDocument>,
    subpages: Vec<CandidateLink>,
}

/// A page waiting on the work stack
#[derive(Debug)]
struct PendingPage {
    url: String,
    depth: u32,
    caption: Option<String>,
}

/// Depth-bounded document link discovery
pub struct Discoverer<'a> {
    client: &'a Client,
    run: &'a RunGuard,
    years: YearRange,
    max_depth: u32,
}

impl<'a> Discoverer<'a> {
    pub fn new(client: &'a Client, run: &'a RunGuard, years: YearRange, max_depth: u32) -> Self {
        Self {
            client,
            run,
            years,
            max_depth,
        }
    }

    /// Discovers documents reachable from `seed` with a fresh visited set
    pub async fn discover(&self, seed: &str) -> Vec<DiscoveredDocument> {
        let mut visited = VisitedSet::new();
        self.discover_from(seed, 0, &mut visited).await
    }

    /// Discovers documents reachable from `url`, which sits at `depth`
    ///
    /// # Termination
    ///
    /// A page already in `visited`, or deeper than the maximum depth, contributes
    /// nothing. Pages are marked visited before they are fetched, so a page that
    /// links to itself is never fetched twice. Sub-pages are only followed from
    /// pages strictly shallower than the maximum depth.
    ///
    /// # Failures
    ///
    /// A page that cannot be fetched or decoded is logged and treated as empty;
    /// discovery always returns whatever the rest of the walk found.
    pub async fn discover_from(
        &self,
        url: &str,
        depth: u32,
        visited: &mut VisitedSet,
    ) -> Vec<DiscoveredDocument> {
        let mut documents = Vec::new();
        let mut stack = vec![PendingPage {
            url: url.to_string(),
            depth,
            caption: None,
        }];

        while let Some(page) = stack.pop() {
            if visited.contains(&page.url) || page.depth > self.max_depth {
                continue;
            }
            visited.insert(page.url.clone());

            if let Some(caption) = &page.caption {
                self.run
                    .log(format!("Descending into: {} -> {}", caption, page.url));
            }

            let Some(scan) = self.scan_page(&page.url, page.depth).await else {
                continue;
            };
            documents.extend(scan.documents);

            if scan.subpages.is_empty() || page.depth >= self.max_depth {
                continue;
            }

            // Reversed so the first sub-page is popped first
            for subpage in scan.subpages.into_iter().rev() {
                if !visited.contains(&subpage.url) {
                    stack.push(PendingPage {
                        url: subpage.url,
                        depth: page.depth + 1,
                        caption: Some(subpage.text),
                    });
                }
            }
        }

        documents
    }

    /// Fetches one page and classifies its anchors
    async fn scan_page(&self, url: &str, depth: u32) -> Option<PageScan> {
        self.run
            .log(format!("Checking page (depth {}): {}", depth, url));

        let (final_url, content_type, body, encoding) = match fetch_page(self.client, url).await {
            FetchResult::Success {
                final_url,
                status_code,
                content_type,
                body,
                encoding,
            } => {
                self.run.log(format!("HTTP status: {}", status_code));
                (final_url, content_type, body, encoding)
            }
            FetchResult::HttpError { status_code } => {
                tracing::warn!("Page {} returned HTTP {}", url, status_code);
                self.run.log(format!(
                    "Failed to fetch page, status {}: {}",
                    status_code, url
                ));
                return None;
            }
            FetchResult::NetworkError { error } => {
                tracing::warn!("Page {} could not be fetched: {}", url, error);
                self.run
                    .log(format!("Error while fetching page: {}, URL: {}", error, url));
                return None;
            }
        };

        if !content_type.is_empty() {
            self.run.log(format!("Content-Type: {}", content_type));
        }
        tracing::debug!("Decoded {} as {}", url, encoding);

        let base_url = match Url::parse(&final_url) {
            Ok(base_url) => base_url,
            Err(e) => {
                self.run
                    .log(format!("Unusable page URL {}: {}", final_url, e));
                return None;
            }
        };

        let parsed = parse_html(&body, &base_url);
        self.run.log(format!(
            "Page title: {}",
            parsed.title.as_deref().unwrap_or("untitled")
        ));
        self.run
            .log(format!("Links found: {}", parsed.link_count));

        let mut scan = PageScan::default();
        for anchor in parsed.anchors {
            if anchor.is_document() {
                if self.years.accepts(&anchor.url, &anchor.text) {
                    self.run.log(format!("Found PDF link: {}", anchor.url));
                    scan.documents.push(DiscoveredDocument {
                        url: anchor.url.clone(),
                        link_text: anchor.text.clone(),
                    });
                } else {
                    self.run.log(format!(
                        "PDF link outside the year range, ignored: {}",
                        anchor.url
                    ));
                }
            }

            if anchor.is_subpage() {
                self.run.log(format!(
                    "Found candidate page: {} -> {}",
                    anchor.text, anchor.url
                ));
                scan.subpages.push(anchor);
            }
        }

        Some(scan)
    }
}
