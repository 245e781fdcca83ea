//! Text heuristics for dating and labelling documents
//!
//! Price-information portals rarely publish structured metadata. What they do
//! publish is text: path segments, link captions and file names such as
//! `2024年3月信息价.pdf`. This module pulls a year, a month and a category label
//! out of that text, turns them into a normalized file name, and decides whether
//! a candidate link falls inside a requested year range.
//!
//! Every function here is pure and total: absence of a match is never an error.

mod filename;
mod text;
mod year_range;

pub use filename::{synthesize_file_name, DEFAULT_LABEL, DOCUMENT_EXTENSION};
pub use text::{decode_percent, extract_category_label, extract_month, extract_year, is_subpage_caption};
pub use year_range::{first_year_token, is_in_year_range, YearRange};
