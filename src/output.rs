//! CLI output formatting for all pipeline stages.
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Merge
//!
//! ```text
//! Layouts
//!     3 base files seeded (+ theme/ reference copies)
//!     [Layout Override] Using user layout: post.njk
//! Includes
//!     5 base files seeded
//!     [Include Override] Using user include: partials/nav.njk
//! ```
//!
//! Every override application is listed individually: replacing a theme file
//! is deliberate but easy to forget, and a stale override shadowing a newer
//! theme file is the first thing to look for when output looks wrong.
//!
//! ## Scan
//!
//! ```text
//! Posts
//!     001 Kyoto in February
//!         Source: src/posts/2026-02-20-kyoto.md
//! Pages
//!     001 Welcome
//!         Source: src/pages/index.md
//! Collections
//!     travel (2 posts)
//! ```
//!
//! ## Generate
//!
//! ```text
//! 001 Kyoto in February → posts/2026-02-20-kyoto/index.html
//! Generated 3 posts, 2 pages, 2 passthrough directories
//! ```

use crate::content::Manifest;
use crate::generate::GenerateSummary;
use crate::overlay::MergeReport;

pub fn format_merge_output(report: &MergeReport) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Layouts".to_string());
    if report.layouts_seeded > 0 {
        lines.push(format!(
            "    {} base files seeded (+ theme/ reference copies)",
            report.layouts_seeded
        ));
    }
    for name in &report.layout_overrides {
        lines.push(format!("    [Layout Override] Using user layout: {name}"));
    }

    lines.push("Includes".to_string());
    if report.includes_seeded > 0 {
        lines.push(format!("    {} base files seeded", report.includes_seeded));
    }
    for name in &report.include_overrides {
        lines.push(format!("    [Include Override] Using user include: {name}"));
    }

    lines
}

pub fn print_merge_output(report: &MergeReport) {
    for line in format_merge_output(report) {
        println!("{line}");
    }
}

pub fn format_scan_output(manifest: &Manifest) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Posts".to_string());
    for (idx, post) in manifest.posts.iter().enumerate() {
        lines.push(entity_header(idx, &post.title));
        lines.push(format!("        Source: {}", post.source_path));
    }

    lines.push("Pages".to_string());
    for (idx, page) in manifest.pages.iter().enumerate() {
        lines.push(entity_header(idx, &page.title));
        lines.push(format!("        Source: {}", page.source_path));
    }

    if !manifest.collections.is_empty() {
        lines.push("Collections".to_string());
        for (name, posts) in &manifest.collections {
            let noun = if posts.len() == 1 { "post" } else { "posts" };
            lines.push(format!("    {name} ({} {noun})", posts.len()));
        }
    }

    lines
}

pub fn print_scan_output(manifest: &Manifest) {
    for line in format_scan_output(manifest) {
        println!("{line}");
    }
}

pub fn format_generate_output(summary: &GenerateSummary) -> Vec<String> {
    let mut lines = Vec::new();

    for (idx, (title, path)) in summary.posts.iter().enumerate() {
        lines.push(format!("{} → {path}", entity_header(idx, title).trim_start_matches(' ')));
    }
    for (idx, (title, path)) in summary.pages.iter().enumerate() {
        lines.push(format!("{} → {path}", entity_header(idx, title).trim_start_matches(' ')));
    }
    for (source, count) in &summary.passthrough {
        let noun = if *count == 1 { "file" } else { "files" };
        lines.push(format!("{source}/ → {count} {noun} copied"));
    }

    lines.push(format!(
        "Generated {} posts, {} pages, {} passthrough directories",
        summary.posts.len(),
        summary.pages.len(),
        summary.passthrough.len()
    ));

    lines
}

pub fn print_generate_output(summary: &GenerateSummary) {
    for line in format_generate_output(summary) {
        println!("{line}");
    }
}

/// Header line for an entity: positional index + title.
fn entity_header(idx: usize, title: &str) -> String {
    format!("    {:03} {title}", idx + 1)
}
