//! Page discovery.
//!
//! Stage 2 of the pipeline. Scans the page root and returns one
//! [`PageDescriptor`] per buildable page, in a deterministic order.
//!
//! ## Nested Layout (standard projects)
//!
//! ```text
//! src/pages/                       # Page root
//! ├── checkout/                    # Module
//! │   ├── cart.html                # Page "cart"
//! │   ├── pay.html                 # Page "pay"
//! │   ├── cart.js
//! │   └── pay/
//! │       └── pay.js               # Found by recursive search
//! └── home/
//!     ├── index.html
//!     └── index.js
//! ```
//!
//! Every `*.html` file directly inside a module is a page. Its script is the
//! file named `<page>.js` anywhere under the module; when several exist the
//! lexicographically first path wins and a warning is logged.
//!
//! ## Flat Layout
//!
//! ```text
//! src/app/
//! ├── about/
//! │   ├── index.html
//! │   └── index.js
//! └── home/
//!     ├── index.html
//!     └── index.js
//! ```
//!
//! Every subdirectory is one page named after the directory.
//!
//! ## Ordering
//!
//! Directory listings are sorted by name before use, so the result does not
//! depend on file-system enumeration order. Entries starting with `.` are ignored.

use crate::naming;
use crate::types::PageDescriptor;
use glob::{MatchOptions, Pattern};
use log::{debug, warn};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

const TEMPLATE_GLOB: &str = "*.html";
const FLAT_TEMPLATE: &str = "index.html";
const FLAT_SCRIPT: &str = "index.js";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Not produced with the built-in `TEMPLATE_GLOB`. An invalid edit to
    /// that constant shows up here instead of as a panic.
    #[error("Invalid template pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("Cannot resolve page '{page}': no {file} in {dir}")]
    PageResolution {
        page: String,
        file: String,
        dir: PathBuf,
    },
}

/// Discover all pages under `page_root`.
///
/// `nested` selects the module-nested layout; otherwise each subdirectory is a page.
pub fn discover(page_root: &Path, nested: bool) -> Result<Vec<PageDescriptor>, DiscoverError> {
    let pages = if nested {
        discover_nested(page_root)?
    } else {
        discover_flat(page_root)?
    };
    debug!(
        "discovered {} page(s) under {}",
        pages.len(),
        page_root.display()
    );
    Ok(pages)
}

fn discover_flat(page_root: &Path) -> Result<Vec<PageDescriptor>, DiscoverError> {
    let mut pages = Vec::new();
    for dir in list_subdirs(page_root)? {
        let page_id = file_name_string(&dir);
        let template_path = require_file(&dir, FLAT_TEMPLATE, &page_id)?;
        let script_path = require_file(&dir, FLAT_SCRIPT, &page_id)?;
        debug!("page {page_id}: {}", template_path.display());
        pages.push(PageDescriptor {
            module_name: None,
            page_id,
            template_path,
            script_path,
        });
    }
    Ok(pages)
}

fn discover_nested(page_root: &Path) -> Result<Vec<PageDescriptor>, DiscoverError> {
    let pattern = Pattern::new(TEMPLATE_GLOB)?;
    let mut pages = Vec::new();

    for module_dir in list_subdirs(page_root)? {
        let module = file_name_string(&module_dir);
        for template_path in list_templates(&module_dir, &pattern)? {
            let file_name = file_name_string(&template_path);
            let Some(page_id) = naming::page_id_from_file_name(&file_name) else {
                continue;
            };
            let script_file = format!("{page_id}.js");
            let script_path = find_script(&module_dir, &script_file)?.ok_or_else(|| {
                DiscoverError::PageResolution {
                    page: format!("{module}/{page_id}"),
                    file: script_file.clone(),
                    dir: module_dir.clone(),
                }
            })?;
            debug!(
                "page {module}/{page_id}: {} + {}",
                template_path.display(),
                script_path.display()
            );
            pages.push(PageDescriptor {
                module_name: Some(module.clone()),
                page_id: page_id.to_string(),
                template_path,
                script_path,
            });
        }
    }
    Ok(pages)
}

/// Immediate, non-hidden subdirectories of `path`, sorted by name.
fn list_subdirs(path: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let path = entry.path();
        if !is_hidden_name(&entry.file_name()) && path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Files directly inside `dir` whose name matches `pattern`, sorted by name.
fn list_templates(dir: &Path, pattern: &Pattern) -> io::Result<Vec<PathBuf>> {
    let mut templates = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let path = entry.path();
        if pattern.matches_with(&name.to_string_lossy(), MATCH_OPTIONS) && path.is_file() {
            templates.push(path);
        }
    }
    templates.sort();
    Ok(templates)
}

/// Search `module_dir` recursively for `script_file`, lexicographically first path wins.
fn find_script(module_dir: &Path, script_file: &str) -> io::Result<Option<PathBuf>> {
    let wanted = OsStr::new(script_file);
    let mut matches = Vec::new();
    let walker = WalkDir::new(module_dir)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !is_hidden(e));
    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() && entry.file_name() == wanted {
            matches.push(entry.into_path());
        }
    }
    matches.sort();
    if matches.len() > 1 {
        // Inherited first-match behaviour; the pick is explicit but may not be intended.
        warn!(
            "{} candidates for {} under {}, using {}",
            matches.len(),
            script_file,
            module_dir.display(),
            matches[0].display()
        );
    }
    Ok(matches.into_iter().next())
}

fn require_file(dir: &Path, name: &str, page_id: &str) -> Result<PathBuf, DiscoverError> {
    let path = dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(DiscoverError::PageResolution {
            page: page_id.to_string(),
            file: name.to_string(),
            dir: dir.to_path_buf(),
        })
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && is_hidden_name(entry.file_name())
}

fn is_hidden_name(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    // =========================================================================
    // Flat layout
    // =========================================================================

    #[test]
    fn flat_pages_from_subdirectories() {
        let tmp = TempDir::new().unwrap();
        add_flat_page(tmp.path(), "home");
        add_flat_page(tmp.path(), "about");

        let pages = discover(tmp.path(), false).unwrap();
        assert_eq!(page_ids(&pages), vec!["about", "home"]);

        let home = find_page(&pages, "home");
        assert_eq!(home.module_name, None);
        assert_eq!(home.template_path, tmp.path().join("home/index.html"));
        assert_eq!(home.script_path, tmp.path().join("home/index.js"));
    }

    #[test]
    fn flat_ignores_files_and_hidden_dirs() {
        let tmp = TempDir::new().unwrap();
        add_flat_page(tmp.path(), "home");
        write_file(tmp.path(), "README.md", "notes");
        write_file(tmp.path(), ".cache/index.html", "");

        let pages = discover(tmp.path(), false).unwrap();
        assert_eq!(page_ids(&pages), vec!["home"]);
    }

    #[test]
    fn flat_missing_script_is_error() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "home/index.html", "<html></html>");

        let result = discover(tmp.path(), false);
        assert!(matches!(
            result,
            Err(DiscoverError::PageResolution { ref page, ref file, .. })
                if page == "home" && file == "index.js"
        ));
    }

    #[test]
    fn flat_missing_template_is_error() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "home/index.js", "");

        let result = discover(tmp.path(), false);
        assert!(matches!(
            result,
            Err(DiscoverError::PageResolution { ref file, .. }) if file == "index.html"
        ));
    }

    // =========================================================================
    // Nested layout
    // =========================================================================

    #[test]
    fn nested_pages_grouped_by_module() {
        let tmp = TempDir::new().unwrap();
        add_nested_page(tmp.path(), "checkout", "pay");
        add_nested_page(tmp.path(), "checkout", "cart");
        add_nested_page(tmp.path(), "account", "login");

        let pages = discover(tmp.path(), true).unwrap();
        let keys: Vec<String> = pages.iter().map(|p| p.entry_key()).collect();
        assert_eq!(
            keys,
            vec!["account/bundle.login", "checkout/bundle.cart", "checkout/bundle.pay"]
        );
        let cart = find_page(&pages, "cart");
        assert_eq!(cart.module_name.as_deref(), Some("checkout"));
        assert_eq!(cart.script_path, tmp.path().join("checkout/cart.js"));
    }

    #[test]
    fn nested_script_found_recursively() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "checkout/pay.html", "");
        write_file(tmp.path(), "checkout/pay/src/pay.js", "");

        let pages = discover(tmp.path(), true).unwrap();
        assert_eq!(
            pages[0].script_path,
            tmp.path().join("checkout/pay/src/pay.js")
        );
    }

    #[test]
    fn nested_ambiguous_script_takes_lexicographically_first() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "checkout/cart.html", "");
        write_file(tmp.path(), "checkout/z/cart.js", "");
        write_file(tmp.path(), "checkout/b/cart.js", "");
        write_file(tmp.path(), "checkout/b/deeper/cart.js", "");

        let pages = discover(tmp.path(), true).unwrap();
        assert_eq!(pages[0].script_path, tmp.path().join("checkout/b/cart.js"));
    }

    #[test]
    fn nested_missing_script_is_page_resolution_error() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "checkout/cart.html", "");
        write_file(tmp.path(), "checkout/other.js", "");

        let result = discover(tmp.path(), true);
        match result {
            Err(DiscoverError::PageResolution { page, file, dir }) => {
                assert_eq!(page, "checkout/cart");
                assert_eq!(file, "cart.js");
                assert_eq!(dir, tmp.path().join("checkout"));
            }
            other => panic!("expected PageResolution, got {other:?}"),
        }
    }

    #[test]
    fn nested_script_in_other_module_does_not_count() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "checkout/cart.html", "");
        write_file(tmp.path(), "shared/cart.js", "");

        let result = discover(tmp.path(), true);
        assert!(matches!(result, Err(DiscoverError::PageResolution { .. })));
    }

    #[test]
    fn nested_templates_are_not_recursive() {
        let tmp = TempDir::new().unwrap();
        add_nested_page(tmp.path(), "home", "index");
        write_file(tmp.path(), "home/partials/header.html", "");

        let pages = discover(tmp.path(), true).unwrap();
        assert_eq!(page_ids(&pages), vec!["index"]);
    }

    #[test]
    fn nested_module_without_templates_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "components/button.js", "");

        let pages = discover(tmp.path(), true).unwrap();
        assert!(pages.is_empty());
    }

    #[test]
    fn nested_skips_hidden_script_directories() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "home/index.html", "");
        write_file(tmp.path(), "home/.backup/index.js", "");

        let result = discover(tmp.path(), true);
        assert!(matches!(result, Err(DiscoverError::PageResolution { .. })));
    }

    // =========================================================================
    // Determinism and I/O
    // =========================================================================

    #[test]
    fn discovery_is_repeatable() {
        let tmp = TempDir::new().unwrap();
        for (module, page) in [("b", "two"), ("a", "one"), ("b", "one"), ("c", "x")] {
            add_nested_page(tmp.path(), module, page);
        }

        let first = discover(tmp.path(), true).unwrap();
        let second = discover(tmp.path(), true).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn missing_page_root_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = discover(&tmp.path().join("nope"), true);
        assert!(matches!(result, Err(DiscoverError::Io(e)) if e.kind() == io::ErrorKind::NotFound));
    }
}
