use regex::Regex;
use std::sync::LazyLock;

/// A 20xx year followed by the year marker or a hyphen.
static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^0-9])(20[0-9]{2})[年\-]").unwrap());

/// A one or two digit number followed by the month marker or a hyphen. The
/// leading guard stops the tail of a year (`2024-`) from reading as month 24.
static MONTH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^0-9])([0-9]{1,2})[月\-]").unwrap());

/// Category vocabulary, in priority order.
static LABEL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(造价[信息]*|信息价|定额|指数|参考价|市场价|建设工程)").unwrap()
});

/// Link captions that mark a listing page worth descending into.
const SUBPAGE_KEYWORDS: [&str; 4] = ["造价", "信息价", "建设工程", "定额"];

/// Extracts the first year (2000-2099) marked by `年` or a hyphen
///
/// # Examples
///
/// ```
/// use pdf_harvester::heuristics::extract_year;
///
/// assert_eq!(extract_year("2024年3月信息价"), Some("2024".to_string()));
/// assert_eq!(extract_year("prices-2023-q1"), Some("2023".to_string()));
/// assert_eq!(extract_year("no year here"), None);
/// ```
pub fn extract_year(text: &str) -> Option<String> {
    YEAR_PATTERN
        .captures(text)
        .map(|captures| captures[1].to_string())
}

/// Extracts the first month marked by `月` or a hyphen, zero-padded to two digits
///
/// # Examples
///
/// ```
/// use pdf_harvester::heuristics::extract_month;
///
/// assert_eq!(extract_month("2024年3月信息价"), Some("03".to_string()));
/// assert_eq!(extract_month("2024-11-prices"), Some("11".to_string()));
/// ```
pub fn extract_month(text: &str) -> Option<String> {
    MONTH_PATTERN
        .captures(text)
        .map(|captures| format!("{:0>2}", &captures[1]))
}

/// Extracts the first category keyword found in the text
pub fn extract_category_label(text: &str) -> Option<String> {
    LABEL_PATTERN
        .captures(text)
        .map(|captures| captures[1].to_string())
}

/// Percent-decodes text; invalid UTF-8 sequences become replacement characters
pub fn decode_percent(text: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(text.as_bytes())).into_owned()
}

/// Returns true if a link caption suggests the target lists documents
pub fn is_subpage_caption(text: &str) -> bool {
    SUBPAGE_KEYWORDS
        .iter()
        .any(|keyword| text.contains(keyword))
}
