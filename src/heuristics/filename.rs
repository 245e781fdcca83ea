use crate::heuristics::text::{decode_percent, extract_category_label, extract_month, extract_year};
use url::Url;

/// Extension every harvested document carries
pub const DOCUMENT_EXTENSION: &str = ".pdf";

/// Label used when no category keyword is found anywhere
pub const DEFAULT_LABEL: &str = "信息价";

/// Builds the file name a downloaded document is stored under
///
/// Year, month and label are looked up in three places, first hit wins for each:
/// the URL path (decoded, separators turned into spaces), the original file name,
/// and the caption of the link that led to the document.
///
/// | Found            | Result                      |
/// |------------------|-----------------------------|
/// | year and month   | `{year}-{month}-{label}.pdf`|
/// | year only        | `{year}-{label}.pdf`        |
/// | no year          | the original name unchanged |
///
/// The result is never empty.
///
/// # Examples
///
/// ```
/// use pdf_harvester::heuristics::synthesize_file_name;
///
/// let name = synthesize_file_name("http://x/files/a.pdf", "a.pdf", Some("2024年3月信息价"));
/// assert_eq!(name, "2024-03-信息价.pdf");
///
/// let name = synthesize_file_name("http://x/files/report.pdf", "report.pdf", None);
/// assert_eq!(name, "report.pdf");
/// ```
pub fn synthesize_file_name(url: &str, original_name: &str, link_text: Option<&str>) -> String {
    let path_text = path_text(url);
    let sources: Vec<&str> = [Some(path_text.as_str()), Some(original_name), link_text]
        .into_iter()
        .flatten()
        .collect();

    let year = sources.iter().find_map(|text| extract_year(text));
    let month = sources.iter().find_map(|text| extract_month(text));
    let label = sources
        .iter()
        .find_map(|text| extract_category_label(text))
        .unwrap_or_else(|| DEFAULT_LABEL.to_string());

    match (year, month) {
        (Some(year), Some(month)) => format!("{}-{}-{}{}", year, month, label, DOCUMENT_EXTENSION),
        (Some(year), None) => format!("{}-{}{}", year, label, DOCUMENT_EXTENSION),
        _ if original_name.trim().is_empty() => format!("document{}", DOCUMENT_EXTENSION),
        _ => original_name.to_string(),
    }
}

/// Decoded URL path with separators replaced by spaces
fn path_text(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    };

    decode_percent(&path)
        .replace('/', " ")
        .trim()
        .to_string()
}
