//! Centralized naming for entries, chunks, and emitted files.
//!
//! Entry keys double as output artifact names, so every stage derives them
//! from the same functions:
//!
//! - `checkout/cart.html` (nested) → entry `checkout/bundle.cart`, page `checkout/cart.html`
//! - `home/index.html` (flat) → entry `home`, page `home/index.html`
//! - library `vendor` → entry `assets/vendor`

use std::path::Path;

/// Directory (under the output root) that receives libraries and copied assets.
pub const ASSETS_DIR: &str = "assets";

/// Name of the synthesized chunk that collects code shared by all pages.
pub const COMMON_CHUNK: &str = "commonLibs";

/// Entry key for a page.
///
/// Nested pages are namespaced by module and prefixed with `bundle.` so the
/// script never shadows the page's own HTML file in the output tree.
pub fn page_entry_key(module: Option<&str>, page_id: &str) -> String {
    match module {
        Some(module) => format!("{module}/bundle.{page_id}"),
        None => page_id.to_string(),
    }
}

/// Entry key for a declared library.
pub fn library_entry_key(name: &str) -> String {
    format!("{ASSETS_DIR}/{name}")
}

/// Page id from an HTML template file name: `cart.html` → `cart`.
///
/// Returns `None` for anything that is not an `.html`/`.htm` file.
pub fn page_id_from_file_name(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(".html")
        .or_else(|| file_name.strip_suffix(".htm"))
        .filter(|stem| !stem.is_empty())
}

/// Output file name of a generated page.
///
/// - nested: `<module>/<page>.html`, or `<module>.html` with `folder_as_name`
/// - flat: `<page>/index.html`; `folder_as_name` has no effect
pub fn page_html_filename(module: Option<&str>, page_id: &str, folder_as_name: bool) -> String {
    match module {
        Some(module) if folder_as_name => format!("{module}.html"),
        Some(module) => format!("{module}/{page_id}.html"),
        None => format!("{page_id}/index.html"),
    }
}

/// Output reference of a copied external asset: `vendor/jquery.min.js` → `assets/jquery.min.js`.
pub fn asset_reference(asset_path: &str) -> Option<String> {
    Path::new(asset_path)
        .file_name()
        .map(|name| format!("{ASSETS_DIR}/{}", name.to_string_lossy()))
}
