use crate::heuristics::text::decode_percent;
use regex::Regex;
use std::sync::LazyLock;
use url::{Position, Url};

static YEAR_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"20[0-9]{2}").unwrap());

/// Inclusive year bounds requested for a crawl
///
/// Both bounds must be present for the range to filter anything; a half-open
/// range includes everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearRange {
    pub start: Option<i32>,
    pub end: Option<i32>,
}

impl YearRange {
    pub fn new(start: Option<i32>, end: Option<i32>) -> Self {
        Self { start, end }
    }

    /// A range that accepts every candidate
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Returns true if both bounds are set
    pub fn is_bounded(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Returns true if the candidate should be kept
    pub fn accepts(&self, url: &str, link_text: &str) -> bool {
        is_in_year_range(url, link_text, self.start, self.end)
    }
}

/// Decides whether a candidate link falls inside an inclusive year range
///
/// The first year-shaped token (`20xx`) in the URL followed by the link text
/// decides. The check fails open: with a missing bound, or with no year token
/// anywhere, the candidate is included.
///
/// Only the part of the URL after the authority is scanned, so host names and
/// port numbers never count as years: `http://zjj2019.gov.cn/a.pdf` carries no
/// date signal, while `http://example.com/2019/a.pdf` does.
///
/// # Examples
///
/// ```
/// use pdf_harvester::heuristics::is_in_year_range;
///
/// assert!(is_in_year_range("http://x/2024/a.pdf", "", Some(2023), Some(2024)));
/// assert!(!is_in_year_range("http://x/2022/a.pdf", "", Some(2023), Some(2024)));
/// assert!(is_in_year_range("http://x/a.pdf", "price list", Some(2023), Some(2024)));
/// assert!(is_in_year_range("http://x/2010/a.pdf", "", None, Some(2024)));
/// ```
pub fn is_in_year_range(
    url: &str,
    link_text: &str,
    start: Option<i32>,
    end: Option<i32>,
) -> bool {
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        _ => return true,
    };

    let haystack = format!("{} {}", date_signal(url), link_text);
    match first_year_token(&haystack) {
        Some(year) => start <= year && year <= end,
        None => true,
    }
}

/// Returns the first `20xx` token in the text
pub fn first_year_token(text: &str) -> Option<i32> {
    YEAR_TOKEN
        .find(text)
        .and_then(|found| found.as_str().parse().ok())
}

/// The decoded path, query and fragment of a URL; unparseable input is used as-is
fn date_signal(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) if parsed.has_host() => decode_percent(&parsed[Position::BeforePath..]),
        _ => url.to_string(),
    }
}
