//! CLI output formatting for discovery and planning.
//!
//! Output is **information-centric**: each entity leads with its positional
//! index and identity (page id, entry key, group name), with file paths shown
//! as indented context lines.
//!
//! # Output Format
//!
//! ## Discover
//!
//! ```text
//! Modules
//! 001 checkout (2 pages)
//!     001 cart
//!         Template: checkout/cart.html
//!         Script: checkout/cart.js
//!     002 pay
//!         Template: checkout/pay.html
//!         Script: checkout/pay/pay.js
//! ```
//!
//! ## Plan
//!
//! ```text
//! Entries (production)
//! 001 checkout/bundle.cart
//!     /abs/src/pages/checkout/cart.js
//! 002 assets/vendor
//!     /abs/src/lib/react.js
//!
//! Chunk groups
//! 001 assets/vendor ← assets/vendor
//! 002 commonLibs ← checkout/bundle.cart
//!
//! Externals
//!     copy /abs/vendor/jquery.js → /abs/dist/assets
//!     alias jquery → jQuery
//!
//! Pages
//! 001 checkout/cart.html
//!     Chunks: assets/vendor, commonLibs, checkout/bundle.cart
//!
//! Planned 2 entries, 2 chunk groups, 1 page
//! ```
//!
//! Each `format_*` function returns `Vec<String>` and does no I/O; the
//! `print_*` wrappers write to stdout.

use crate::plan::BuildPlan;
use crate::types::PageDescriptor;
use indexmap::IndexMap;
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

/// `1 page`, `2 pages`.
fn count_noun(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Index + title, with an optional page count.
///
/// ```text
/// 001 checkout (2 pages)
/// 001 home
/// ```
fn entity_header(index: usize, title: &str, pages: Option<usize>) -> String {
    match pages {
        Some(n) => format!(
            "{} {} ({})",
            format_index(index),
            title,
            count_noun(n, "page", "pages")
        ),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Path relative to `root` when possible.
fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

fn page_context(page: &PageDescriptor, root: &Path, depth: usize) -> Vec<String> {
    vec![
        format!(
            "{}Template: {}",
            indent(depth),
            relative(&page.template_path, root)
        ),
        format!("{}Script: {}", indent(depth), relative(&page.script_path, root)),
    ]
}

// ============================================================================
// Discover output
// ============================================================================

/// Format discovered pages, grouped by module when the layout is nested.
pub fn format_discover_output(pages: &[PageDescriptor], page_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    if pages.is_empty() {
        lines.push(format!("No pages found in {}", page_root.display()));
        return lines;
    }

    if pages.iter().all(|p| p.module_name.is_none()) {
        lines.push("Pages".to_string());
        for (i, page) in pages.iter().enumerate() {
            lines.push(entity_header(i + 1, &page.page_id, None));
            lines.extend(page_context(page, page_root, 1));
        }
        return lines;
    }

    lines.push("Modules".to_string());
    let mut groups: IndexMap<&str, Vec<&PageDescriptor>> = IndexMap::new();
    for page in pages {
        let module = page.module_name.as_deref().unwrap_or_default();
        groups.entry(module).or_default().push(page);
    }
    for (i, (module, members)) in groups.iter().enumerate() {
        lines.push(entity_header(i + 1, module, Some(members.len())));
        for (j, page) in members.iter().enumerate() {
            lines.push(format!(
                "{}{}",
                indent(1),
                entity_header(j + 1, &page.page_id, None)
            ));
            lines.extend(page_context(page, page_root, 2));
        }
    }
    lines
}

/// Print discovered pages to stdout.
pub fn print_discover_output(pages: &[PageDescriptor], page_root: &Path) {
    for line in format_discover_output(pages, page_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Plan output
// ============================================================================

/// Format a human-readable summary of a build plan.
pub fn format_plan_output(plan: &BuildPlan) -> Vec<String> {
    let mode = if plan.mode.is_development() {
        "development"
    } else {
        "production"
    };
    let mut lines = vec![format!("Entries ({mode})")];
    for (i, entry) in plan.entries.iter().enumerate() {
        lines.push(entity_header(i + 1, &entry.entry_key, None));
        for source in &entry.source_files {
            lines.push(format!("{}{}", indent(1), source));
        }
    }

    if !plan.chunk_groups.is_empty() {
        lines.push(String::new());
        lines.push("Chunk groups".to_string());
        for (i, group) in plan.chunk_groups.iter().enumerate() {
            let members: Vec<&str> = group.member_entry_keys.iter().map(String::as_str).collect();
            lines.push(format!(
                "{} ← {}",
                entity_header(i + 1, &group.group_name, None),
                members.join(", ")
            ));
        }
    }

    if !plan.external_assets.is_empty() || !plan.aliases.is_empty() {
        lines.push(String::new());
        lines.push("Externals".to_string());
        for copy in &plan.external_assets {
            lines.push(format!(
                "{}copy {} → {}",
                indent(1),
                copy.from.display(),
                copy.to.display()
            ));
        }
        for (name, alias) in &plan.aliases {
            lines.push(format!("{}alias {} → {}", indent(1), name, alias));
        }
    }

    if !plan.html_pages.is_empty() {
        lines.push(String::new());
        lines.push("Pages".to_string());
        for (i, page) in plan.html_pages.iter().enumerate() {
            lines.push(entity_header(i + 1, &page.filename, None));
            lines.push(format!("{}Chunks: {}", indent(1), page.chunks.join(", ")));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Planned {}, {}, {}",
        count_noun(plan.entries.len(), "entry", "entries"),
        count_noun(plan.chunk_groups.len(), "chunk group", "chunk groups"),
        count_noun(plan.html_pages.len(), "page", "pages")
    ));
    lines
}

/// Print a build plan summary to stdout.
pub fn print_plan_output(plan: &BuildPlan) {
    for line in format_plan_output(plan) {
        println!("{}", line);
    }
}
