//! CLI output formatting for all pipeline stages.
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.
//!
//! Example `generate` output:
//!
//! ```text
//! Python 3.10
//!     Generated: 2, reused: 38
//!     Failed: Datatypes_Primitives (rate limit exceeded: …)
//! Rust
//!     Generated: 40, reused: 0
//!
//! Generated 42 concepts (38 reused, 1 failed)
//! ```

use std::path::Path;

use crate::generate::GenerateSummary;
use crate::render::RenderSummary;
use crate::verify::VerifyReport;

/// Mismatches shown before eliding the rest of a verify report.
const MAX_SHOWN_MISMATCHES: usize = 50;

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

// ============================================================================
// Generate stage
// ============================================================================

pub fn format_generate_summary(summary: &GenerateSummary) -> Vec<String> {
    let mut lines = Vec::new();
    for report in &summary.reports {
        lines.push(report.language.clone());
        lines.push(format!(
            "{}Generated: {}, reused: {}",
            indent(1),
            report.generated,
            report.reused
        ));
        for failure in &report.failed {
            lines.push(format!(
                "{}Failed: {} ({})",
                indent(1),
                failure.composite,
                failure.error
            ));
        }
        if let Some(reason) = &report.aborted {
            lines.push(format!("{}Aborted: {}", indent(1), reason));
        }
    }
    lines.push(String::new());
    lines.push(format!(
        "Generated {} concepts ({} reused, {} failed)",
        summary.total_generated(),
        summary.total_reused(),
        summary.total_failed()
    ));
    lines
}

pub fn print_generate_summary(summary: &GenerateSummary) {
    for line in format_generate_summary(summary) {
        println!("{line}");
    }
}

// ============================================================================
// Render stage
// ============================================================================

pub fn format_render_summary(summary: &RenderSummary) -> Vec<String> {
    let mut lines = Vec::new();
    for lang in &summary.languages {
        lines.push(format!(
            "{} ({} concept pages + landing)",
            lang.language, lang.concept_pages
        ));
    }
    for language in &summary.skipped {
        lines.push(format!(
            "Warning: no content document for {language}, skipped"
        ));
    }
    lines.push(String::new());
    lines.push(format!(
        "Rendered {} pages ({} concept pages, {} landing pages)",
        summary.total_pages(),
        summary.concept_pages(),
        summary.landing_pages
    ));
    lines
}

pub fn print_render_summary(summary: &RenderSummary) {
    for line in format_render_summary(summary) {
        println!("{line}");
    }
}

// ============================================================================
// Sitemap stage
// ============================================================================

pub fn format_sitemap_output(url_count: usize, sitemap_path: &Path) -> Vec<String> {
    vec![format!(
        "Wrote {} URLs to {}",
        url_count,
        sitemap_path.display()
    )]
}

pub fn print_sitemap_output(url_count: usize, sitemap_path: &Path) {
    for line in format_sitemap_output(url_count, sitemap_path) {
        println!("{line}");
    }
}

// ============================================================================
// Verify stage
// ============================================================================

pub fn format_verify_report(report: &VerifyReport) -> Vec<String> {
    let mut lines = vec![format!("Checked {} sitemap URLs", report.checked)];
    if report.is_clean() {
        lines.push("All URLs have corresponding files".to_string());
        return lines;
    }
    lines.push(format!("Missing files: {}", report.missing.len()));
    for mismatch in report.missing.iter().take(MAX_SHOWN_MISMATCHES) {
        lines.push(format!("{}URL: {}", indent(1), mismatch.url));
        lines.push(format!(
            "{}Expected file: {}",
            indent(1),
            mismatch.expected.display()
        ));
    }
    if report.missing.len() > MAX_SHOWN_MISMATCHES {
        lines.push(format!(
            "{}... and {} more",
            indent(1),
            report.missing.len() - MAX_SHOWN_MISMATCHES
        ));
    }
    lines
}

pub fn print_verify_report(report: &VerifyReport) {
    for line in format_verify_report(report) {
        println!("{line}");
    }
}
