use crate::crawler::StatusReport;
use crate::state::Progress;
use crate::storage::StoredFile;
use std::fmt::Write;

const BAR_WIDTH: usize = 30;

/// Renders progress as a single console line
///
/// # Example
///
/// ```
/// use pdf_harvester::output::format_progress_line;
/// use pdf_harvester::state::Progress;
///
/// let progress = Progress { total: 4, current: 2, filename: "a.pdf".to_string(), percentage: 50 };
/// assert!(format_progress_line(&progress).contains("50% (2/4)"));
/// ```
pub fn format_progress_line(progress: &Progress) -> String {
    let filled = (progress.percentage as usize * BAR_WIDTH) / 100;
    let current = if progress.filename.is_empty() {
        "preparing..."
    } else {
        progress.filename.as_str()
    };

    format!(
        "[{}{}] {:>3}% ({}/{}) {}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        progress.percentage,
        progress.current,
        progress.total,
        current
    )
}

/// Renders the file table, one file per line with its modification time
pub fn format_file_listing(files: &[StoredFile]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Downloaded files ({}):", files.len());
    for file in files {
        let _ = writeln!(
            out,
            "  {}  {:>10}  {}",
            file.modified.format("%Y-%m-%d %H:%M:%S"),
            file.size,
            file.name
        );
    }
    out
}

/// Prints a full status report
pub fn print_status(status: &StatusReport) {
    println!("=== Harvester Status ===\n");

    if status.running {
        println!("Crawl running");
    } else if let Some(last_run) = &status.last_run {
        println!("Last run finished: {}", last_run);
    } else {
        println!("No crawl has run yet");
    }

    println!("Files in destination: {}", status.file_count);
    println!("{}", format_progress_line(&status.progress));

    if !status.debug_log.is_empty() {
        println!("\nDebug log:");
        for line in &status.debug_log {
            println!("  {}", line);
        }
    }
}

/// Prints the file table
pub fn print_file_listing(files: &[StoredFile]) {
    print!("{}", format_file_listing(files));
}
