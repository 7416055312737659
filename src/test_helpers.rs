//! Shared test utilities for the pageplan test suite.
//!
//! Provides project-tree builders for discovery tests, in-memory page
//! descriptors for plan tests, and lookup helpers that panic with a clear
//! message on miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! add_nested_page(tmp.path(), "checkout", "cart");
//! let pages = discover(tmp.path(), true).unwrap();
//! assert_eq!(page_ids(&pages), vec!["cart"]);
//!
//! let plan = build_plan(&config, &[flat_page("home")], "production", None, &ws).unwrap();
//! assert_eq!(members(find_group(&plan, "commonLibs")), vec!["home"]);
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::plan::{BuildPlan, ChunkGroup};
use crate::types::PageDescriptor;

// =========================================================================
// Project tree builders
// =========================================================================

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Add a flat-layout page: `<id>/index.html` + `<id>/index.js`.
pub fn add_flat_page(root: &Path, page_id: &str) {
    write_file(root, &format!("{page_id}/index.html"), "<html></html>");
    write_file(root, &format!("{page_id}/index.js"), "");
}

/// Add a nested-layout page: `<module>/<id>.html` + `<module>/<id>.js`.
pub fn add_nested_page(root: &Path, module: &str, page_id: &str) {
    write_file(root, &format!("{module}/{page_id}.html"), "<html></html>");
    write_file(root, &format!("{module}/{page_id}.js"), "");
}

// =========================================================================
// In-memory descriptors (rooted at /project)
// =========================================================================

/// Flat page under `/project/src/app/<id>/`.
pub fn flat_page(page_id: &str) -> PageDescriptor {
    let dir = PathBuf::from("/project/src/app").join(page_id);
    PageDescriptor {
        module_name: None,
        page_id: page_id.to_string(),
        template_path: dir.join("index.html"),
        script_path: dir.join("index.js"),
    }
}

/// Nested page under `/project/src/pages/<module>/`.
pub fn nested_page(module: &str, page_id: &str) -> PageDescriptor {
    let dir = PathBuf::from("/project/src/pages").join(module);
    PageDescriptor {
        module_name: Some(module.to_string()),
        page_id: page_id.to_string(),
        template_path: dir.join(format!("{page_id}.html")),
        script_path: dir.join(format!("{page_id}.js")),
    }
}

// =========================================================================
// Lookups and extractors
// =========================================================================

/// All page ids in discovery order.
pub fn page_ids(pages: &[PageDescriptor]) -> Vec<&str> {
    pages.iter().map(|p| p.page_id.as_str()).collect()
}

/// Find a page by id. Panics if not found.
pub fn find_page<'a>(pages: &'a [PageDescriptor], page_id: &str) -> &'a PageDescriptor {
    pages
        .iter()
        .find(|p| p.page_id == page_id)
        .unwrap_or_else(|| panic!("page '{page_id}' not found. Available: {:?}", page_ids(pages)))
}

/// All entry keys in plan order.
pub fn entry_keys(plan: &BuildPlan) -> Vec<&str> {
    plan.entries.iter().map(|e| e.entry_key.as_str()).collect()
}

/// All chunk group names in plan order.
pub fn group_names(plan: &BuildPlan) -> Vec<&str> {
    plan.chunk_groups
        .iter()
        .map(|g| g.group_name.as_str())
        .collect()
}

/// Find a chunk group by name. Panics if not found.
pub fn find_group<'a>(plan: &'a BuildPlan, name: &str) -> &'a ChunkGroup {
    plan.chunk_groups
        .iter()
        .find(|g| g.group_name == name)
        .unwrap_or_else(|| {
            panic!(
                "chunk group '{name}' not found. Available: {:?}",
                group_names(plan)
            )
        })
}

/// Member keys of a chunk group, in insertion order.
pub fn members(group: &ChunkGroup) -> Vec<&str> {
    group.member_entry_keys.iter().map(String::as_str).collect()
}
