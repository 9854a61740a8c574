//! CLI output formatting for build, check, and cleanup results.
//!
//! Each result has a `format_*` function returning display lines (pure, no
//! I/O, testable) and a `print_*` wrapper that writes them to stdout. The
//! build summary is information-first: every directory leads with its name,
//! file count, and aggregated size, indented by depth.
//!
//! ```text
//! Directories
//! / (2 files, 1.21KB)
//!     photos (14 files, 32.50MB)
//!         2024 (9 files, 21.08MB)
//!     notes (3 files, 0.82KB)
//!
//! Indexed 4 directories, 28 files, 32.53MB total
//! ```

use crate::cleanup::{Report, Targets};
use crate::scan::DirSummary;
use crate::types::size_format;

/// Indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format the per-directory summary tree for build/check output.
pub fn format_build_summary(summaries: &[DirSummary]) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push("Directories".to_string());
    for summary in summaries {
        let label = if summary.path == "." {
            "/"
        } else {
            summary.path.rsplit('/').next().unwrap_or(&summary.path)
        };
        lines.push(format!(
            "{}{} ({} files, {})",
            indent(summary.depth),
            label,
            summary.file_count,
            size_format(summary.size, false)
        ));
    }

    let total_files: usize = summaries.iter().map(|s| s.file_count).sum();
    let total_size = summaries.first().map(|s| s.size).unwrap_or(0);
    lines.push(String::new());
    lines.push(format!(
        "Indexed {} directories, {} files, {} total",
        summaries.len(),
        total_files,
        size_format(total_size, false)
    ));
    lines
}

/// Print the build summary to stdout.
pub fn print_build_summary(summaries: &[DirSummary]) {
    for line in format_build_summary(summaries) {
        println!("{line}");
    }
}

/// Format the list of artifacts a cleanup would delete.
pub fn format_cleanup_targets(targets: &Targets) -> Vec<String> {
    let mut lines = Vec::new();
    for dir in &targets.directories {
        lines.push(format!("[DIR ] {}", dir.display()));
    }
    for file in &targets.files {
        lines.push(format!("[FILE] {}", file.display()));
    }
    lines.push(format!(
        "{} directories and {} files will be deleted.",
        targets.directories.len(),
        targets.files.len()
    ));
    lines
}

/// Print the cleanup target list to stdout.
pub fn print_cleanup_targets(targets: &Targets) {
    for line in format_cleanup_targets(targets) {
        println!("{line}");
    }
}

/// Format the outcome of a cleanup sweep.
pub fn format_cleanup_report(report: &Report) -> Vec<String> {
    let mut lines = Vec::new();
    for path in &report.skipped {
        lines.push(format!("[SKIP] {} (not generated by this tool)", path.display()));
    }
    for (path, source) in &report.failures {
        lines.push(format!("[FAIL] {}: {}", path.display(), source));
    }
    lines.push(format!(
        "Deleted {} directories and {} files.",
        report.deleted_dirs, report.deleted_files
    ));
    if report.failures.is_empty() {
        lines.push("Cleanup finished.".to_string());
    } else {
        lines.push(format!("Cleanup failed: {} errors.", report.failures.len()));
    }
    lines
}

/// Print the cleanup report to stdout.
pub fn print_cleanup_report(report: &Report) {
    for line in format_cleanup_report(report) {
        println!("{line}");
    }
}
