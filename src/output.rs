//! CLI output formatting for card generation.
//!
//! # Information-First Display
//!
//! Every line leads with the document's title; the card path is secondary
//! context after an arrow. Grouping by content type keeps the output
//! readable as an inventory of the site.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! posts (3 documents)
//!     Advanced Markdown Tips → assets/images/og/posts/advanced-markdown-tips.png
//!     Hello World: exists, skipped (assets/images/og/posts/hello-world.png)
//!     Half-Finished Idea: draft, skipped
//! warning: unknown content type "recipes", skipped
//! error: Broken Post: Config error: Invalid config value for `canvas.width`: ...
//! error: _posts/2024-01-02-bad.md: Invalid front matter in ...
//!
//! Generated 1 card, skipped 2, 1 failed, 1 unreadable
//! ```
//!
//! Type headers and skip lines are verbose-only. Generated cards, warnings,
//! failures, and the summary are always shown.
//!
//! ## Check
//!
//! ```text
//! posts (2 documents)
//!     001 Advanced Markdown Tips → assets/images/og/posts/advanced-markdown-tips.png
//!     002 Half-Finished Idea (draft)
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::config::OgImageConfig;
use crate::content::ContentSite;
use crate::generate::{GenerateEvent, GenerateReport, SkipReason};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Generate
// ============================================================================

/// Format a single generator event as display lines.
///
/// Returns no lines for events hidden when `verbose` is off. A skip line is
/// still shown when the document itself sets `verbose`.
pub fn format_generate_event(event: &GenerateEvent, verbose: bool) -> Vec<String> {
    match event {
        GenerateEvent::TypeStarted {
            content_type,
            count,
        } => {
            if verbose {
                vec![format!(
                    "{} ({})",
                    content_type,
                    plural(*count, "document", "documents")
                )]
            } else {
                Vec::new()
            }
        }
        GenerateEvent::UnknownContentType { content_type } => {
            vec![format!(
                "warning: unknown content type {:?}, skipped",
                content_type
            )]
        }
        GenerateEvent::Generated { title, path, .. } => {
            vec![format!("    {} \u{2192} {}", title, path)]
        }
        GenerateEvent::Skipped {
            title,
            reason,
            path,
            verbose: document_verbose,
            ..
        } => {
            if !verbose && !document_verbose {
                return Vec::new();
            }
            let why = match reason {
                SkipReason::Draft => "draft",
                SkipReason::Disabled => "disabled",
                SkipReason::Exists => "exists",
            };
            match path {
                Some(p) => vec![format!("    {}: {}, skipped ({})", title, why, p)],
                None => vec![format!("    {}: {}, skipped", title, why)],
            }
        }
        GenerateEvent::Failed { title, error, .. } => {
            vec![format!("error: {}: {}", title, error)]
        }
    }
}

/// Format the one-line end-of-run summary.
///
/// `unreadable` counts documents the scan had to leave out.
pub fn format_summary(report: &GenerateReport, unreadable: usize) -> Vec<String> {
    let mut summary = format!(
        "Generated {}, skipped {}",
        plural(report.generated.len(), "card", "cards"),
        report.skipped
    );
    if !report.failures.is_empty() {
        summary.push_str(&format!(", {} failed", report.failures.len()));
    }
    if unreadable > 0 {
        summary.push_str(&format!(", {} unreadable", unreadable));
    }
    vec![String::new(), summary]
}

pub fn print_summary(report: &GenerateReport, unreadable: usize) {
    for line in format_summary(report, unreadable) {
        println!("{}", line);
    }
}

// ============================================================================
// Scan
// ============================================================================

/// One `error:` line per document the scan could not read, paths relative
/// to the site source.
pub fn format_scan_failures(site: &ContentSite, source: &Path) -> Vec<String> {
    site.failures()
        .iter()
        .map(|failure| {
            let path = failure.path.strip_prefix(source).unwrap_or(&failure.path);
            format!("error: {}: {}", path.display(), failure.error)
        })
        .collect()
}

pub fn print_scan_failures(site: &ContentSite, source: &Path) {
    for line in format_scan_failures(site, source) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the planned cards without rendering anything.
///
/// Lists every configured content type with its documents and the card path
/// each one would get. Unknown types are flagged.
pub fn format_check_output(site: &ContentSite, config: &OgImageConfig) -> Vec<String> {
    let mut lines = Vec::new();

    for content_type in &config.collections {
        let Some(items) = site.items(content_type) else {
            lines.push(format!(
                "warning: unknown content type {:?}, skipped",
                content_type
            ));
            continue;
        };
        lines.push(format!(
            "{} ({})",
            content_type,
            plural(items.len(), "document", "documents")
        ));
        for (i, item) in items.iter().enumerate() {
            if item.draft && config.skip_drafts {
                lines.push(format!("    {} {} (draft)", format_index(i + 1), item.title));
            } else {
                lines.push(format!(
                    "    {} {} \u{2192} {}/{}/{}.png",
                    format_index(i + 1),
                    item.title,
                    config.output_dir.trim_end_matches('/'),
                    content_type,
                    item.slug
                ));
            }
        }
    }

    lines
}

pub fn print_check_output(site: &ContentSite, config: &OgImageConfig) {
    for line in format_check_output(site, config) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
