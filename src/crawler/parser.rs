//! HTML parser for extracting anchors and metadata
//!
//! This module handles parsing HTML content to extract:
//! - Anchors with their resolved URL, raw href and caption
//! - Page title

use crate::heuristics::{is_subpage_caption, DOCUMENT_EXTENSION};
use scraper::{Html, Selector};
use url::Url;

/// An anchor found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    /// Absolute URL the anchor points to
    pub url: String,

    /// The href attribute as written in the page
    pub href: String,

    /// Trimmed anchor text
    pub text: String,
}

impl CandidateLink {
    /// Returns true if the href names a document file
    pub fn is_document(&self) -> bool {
        self.href.to_lowercase().ends_with(DOCUMENT_EXTENSION)
    }

    /// Returns true if the caption marks a page worth descending into
    pub fn is_subpage(&self) -> bool {
        is_subpage_caption(&self.text)
    }
}

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// All anchors with a usable href, in document order
    pub anchors: Vec<CandidateLink>,

    /// Number of `<a>` elements on the page, usable or not
    pub link_count: usize,
}

/// Parses HTML content and extracts anchors and the title
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links
/// - Non-HTTP(S) URLs after resolution
///
/// # Example
///
/// ```
/// use pdf_harvester::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>价格</title></head><body><a href="/a.pdf">2024年3月信息价</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/list/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("价格".to_string()));
/// assert_eq!(parsed.anchors[0].url, "https://example.com/a.pdf");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        anchors: extract_anchors(&document, base_url),
        link_count: count_links(&document),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn count_links(document: &Html) -> usize {
    Selector::parse("a")
        .map(|selector| document.select(&selector).count())
        .unwrap_or(0)
}

fn extract_anchors(document: &Html, base_url: &Url) -> Vec<CandidateLink> {
    let mut anchors = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            if let Some(url) = resolve_link(href, base_url) {
                anchors.push(CandidateLink {
                    url,
                    href: href.trim().to_string(),
                    text: element.text().collect::<String>().trim().to_string(),
                });
            }
        }
    }

    anchors
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}
