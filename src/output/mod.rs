//! Output module for console reporting
//!
//! This module renders status snapshots and file listings for the command-line
//! driver:
//! - A one-line progress bar for polling loops
//! - A full status report with the debug log
//! - The downloaded file table

mod report;

pub use report::{
    format_file_listing, format_progress_line, print_file_listing, print_status,
};
