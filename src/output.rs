//! CLI output formatting for `build` and `check`.
//!
//! Each report has a pure `format_*` function returning lines, so tests can
//! assert on exact output, and a `print_*` wrapper that writes them to stdout.
//! Diagnostics go through `log`; only the report itself is printed here.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Pages
//!     index.html (8412 bytes, sha256 3f9a0c1d22be)
//!     reading.html (5120 bytes, sha256 a0b1c2d3e4f5)
//!
//! Missing optional assets
//!     book/2023/thinking-in-systems-300.jpg
//!
//! Built 2 pages → .
//! ```
//!
//! ## Check
//!
//! Same page list, closing with `Checked 2 pages, nothing written`.

use crate::build::{BuildReport, PageReport};

fn page_line(page: &PageReport) -> String {
    format!(
        "    {} ({} bytes, sha256 {})",
        page.name, page.bytes, page.digest
    )
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Format a build or check report.
///
/// `output_dir` is shown as given in the config.
pub fn format_build_report(report: &BuildReport, output_dir: &str) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    lines.extend(report.pages.iter().map(page_line));

    if !report.missing_assets.is_empty() {
        lines.push(String::new());
        lines.push("Missing optional assets".to_string());
        for asset in &report.missing_assets {
            lines.push(format!("    {asset}"));
        }
    }

    lines.push(String::new());
    let pages = plural(report.pages.len(), "page");
    if report.written {
        lines.push(format!("Built {pages} \u{2192} {output_dir}"));
    } else {
        lines.push(format!("Checked {pages}, nothing written"));
    }
    lines
}

/// Print a build or check report to stdout.
pub fn print_build_report(report: &BuildReport, output_dir: &str) {
    for line in format_build_report(report, output_dir) {
        println!("{}", line);
    }
}
