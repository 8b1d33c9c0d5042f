//! CLI output formatting for both pipelines.
//!
//! # Information-First Display
//!
//! Every post is shown by its positional index and title first, with the
//! file it came from or the file it produced as indented context. Failures
//! lead with the source file name, since there may be no title to show.
//!
//! # Output Format
//!
//! ## Fonts
//!
//! ```text
//! Fonts (2 loaded)
//!     Inter 400 normal
//!     Inter 800 normal
//!     unavailable: assets/fonts/Missing.ttf
//!         Error: failed to read ...
//! ```
//!
//! ## OG
//!
//! ```text
//! draft: wip-draft.md
//! failed: broken-header.md
//!     Error: Malformed front-matter: could not find expected ':' at line 3 ...
//! 001 Hello, World
//!     Output: public/og/Hello-World.png
//!
//! Generated 1 card, 1 skipped, 1 failed
//! ```
//!
//! ## Pages
//!
//! ```text
//! 001 Hello, World → blog/Hello-World/index.html
//! failed: broken-header.md
//!     Error: ...
//! Index → blog/index.json
//!
//! Wrote 1 page, 1 skipped, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each section has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::card::FontLoad;
use crate::og::{OgEvent, OgReport};
use crate::pages::PagesReport;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `n` followed by the singular or plural noun.
fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

/// Path relative to `root` when it lies under it.
fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn failure_lines(file: &str, error: &str) -> Vec<String> {
    vec![
        format!("failed: {file}"),
        format!("{}Error: {error}", indent(1)),
    ]
}

// ============================================================================
// Fonts
// ============================================================================

/// Format the result of font assembly.
pub fn format_font_load(load: &FontLoad) -> Vec<String> {
    let mut lines = vec![format!("Fonts ({} loaded)", load.fonts.len())];
    for font in load.fonts.iter() {
        lines.push(format!(
            "{}{} {} {}",
            indent(1),
            font.family,
            font.weight,
            font.style.as_css()
        ));
    }
    if load.fonts.is_empty() {
        lines.push(format!("{}none, using system fonts", indent(1)));
    }
    for failure in &load.failures {
        lines.push(format!("{}unavailable: {}", indent(1), failure.location));
        lines.push(format!("{}Error: {}", indent(2), failure.error));
    }
    lines
}

pub fn print_font_load(load: &FontLoad) {
    for line in format_font_load(load) {
        println!("{}", line);
    }
}

// ============================================================================
// OG output
// ============================================================================

/// Format a single OG progress event as display lines.
pub fn format_og_event(event: &OgEvent, root: &Path) -> Vec<String> {
    match event {
        OgEvent::DraftSkipped { file } => vec![format!("draft: {file}")],
        OgEvent::Generated {
            index,
            title,
            output,
            ..
        } => vec![
            format!("{} {}", format_index(*index), title),
            format!("{}Output: {}", indent(1), relative(output, root)),
        ],
        OgEvent::Failed { file, error } => failure_lines(file, error),
    }
}

/// Format the closing summary of an OG run.
pub fn format_og_summary(report: &OgReport) -> Vec<String> {
    vec![
        String::new(),
        format!(
            "Generated {}, {} skipped, {} failed",
            count(report.generated.len(), "card", "cards"),
            report.skipped.len(),
            report.failed.len()
        ),
    ]
}

pub fn print_og_summary(report: &OgReport) {
    for line in format_og_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Pages output
// ============================================================================

/// Format the result of page generation. Paths are shown relative to the
/// pages directory.
pub fn format_pages_report(report: &PagesReport, pages_dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for file in &report.skipped {
        lines.push(format!("draft: {file}"));
    }
    for failure in &report.failed {
        lines.extend(failure_lines(&failure.file, &failure.error.to_string()));
    }
    for (i, page) in report.written.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            page.title,
            relative(&page.output, pages_dir)
        ));
    }
    lines.push(format!(
        "Index \u{2192} {}",
        relative(&report.index, pages_dir)
    ));
    lines.push(String::new());
    lines.push(format!(
        "Wrote {}, {} skipped, {} failed",
        count(report.written.len(), "page", "pages"),
        report.skipped.len(),
        report.failed.len()
    ));
    lines
}

pub fn print_pages_report(report: &PagesReport, pages_dir: &Path) {
    for line in format_pages_report(report, pages_dir) {
        println!("{}", line);
    }
}
