//! Project configuration module.
//!
//! Handles loading, validating, and merging the project document (`abc.json`).
//! Configuration is two-layered: stock defaults are overridden by the project
//! document at the project root.
//!
//! ## Document Location
//!
//! ```text
//! my-project/
//! ├── abc.json            # Project document (abc.toml is accepted as a fallback)
//! └── src/
//!     ├── lib/            # Library sources referenced from "library"
//!     └── pages/
//!         └── ...
//! ```
//!
//! ## Document Format
//!
//! ```json
//! {
//!   "library": { "vendor": ["lib/react.js", "lib/react-dom.js"] },
//!   "externals": { "jquery": { "alias": "jQuery", "path": "vendor/jquery.min.js" } },
//!   "browser_support": {
//!     "DEVELOPMENT": ["last 2 versions"],
//!     "PRODUCTION": ["last 2 versions", "ie >= 10"]
//!   },
//!   "build_path": "./dist",
//!   "base64": { "enable": true, "limit": 10000 },
//!   "publicPath": "../",
//!   "htmlAssetsInject": true,
//!   "framework": "react",
//!   "reactHotReload": false
//! }
//! ```
//!
//! ## Merge Semantics
//!
//! The merge is **shallow**: a top-level key present in the document replaces
//! the stock value wholesale. Nested objects such as `base64` are not merged
//! key-by-key; a partial `base64` object falls back to the stock values of the
//! `base64` type itself, never to whatever the caller passed as defaults.
//!
//! Unknown keys are rejected to catch typos early. The historical spelling
//! `libiary` is accepted as an alias of `library`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name of the project document at the project root.
pub const PROJECT_DOCUMENT: &str = "abc.json";
/// TOML rendition of the project document, read only when no JSON document exists.
pub const PROJECT_DOCUMENT_TOML: &str = "abc.toml";

/// Top-level keys accepted under a legacy spelling, mapped to the canonical key.
const KEY_ALIASES: &[(&str, &str)] = &[("libiary", "library")];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("No browser targets configured for environment '{0}' (add it under browser_support)")]
    MissingBrowserTargets(String),
    #[error("A dev-server port is required in development mode")]
    MissingDevServerPort,
}

/// Resolved project configuration.
///
/// All fields have stock defaults (see [`ProjectConfig::default`]). Documents
/// need only specify the top-level keys they want to replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Library groups: name → source files relative to the source root.
    #[serde(rename = "library")]
    pub libraries: IndexMap<String, Vec<String>>,
    /// Pre-built modules that are copied and/or aliased instead of bundled.
    pub externals: IndexMap<String, ExternalDef>,
    /// Browser queries per environment. Keys are matched case-insensitively.
    #[serde(rename = "browser_support")]
    pub browser_targets: IndexMap<String, Vec<String>>,
    /// Output directory, relative to the project root.
    #[serde(rename = "build_path")]
    pub output_dir: String,
    #[serde(rename = "publicPath")]
    pub public_path: String,
    #[serde(rename = "base64")]
    pub base64_inline: Base64Inline,
    /// Emit ES3-safe script output (reserved-word property access, no getters).
    #[serde(rename = "supportIE8")]
    pub support_ie8: bool,
    /// Whether generated pages get script/style tags injected.
    #[serde(rename = "htmlAssetsInject")]
    pub html_inject_assets: bool,
    pub framework: Framework,
    #[serde(rename = "reactHotReload")]
    pub react_hot_reload: bool,
    /// Forwarded to the script transpiler's polyfill handling.
    #[serde(rename = "useBuiltIns")]
    pub use_built_ins: bool,
    /// Compile `.svg` imports to components (react only).
    #[serde(rename = "svgToReactComponent")]
    pub svg_to_react_component: bool,
    /// Nested layouts only: name each page after its module, `<module>.html`.
    #[serde(rename = "useFolderAsHtmlName")]
    pub use_folder_as_html_name: bool,
    #[serde(rename = "serviceWorkConf")]
    pub service_worker: ServiceWorkerConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        let mut browser_targets = IndexMap::new();
        browser_targets.insert("DEVELOPMENT".to_string(), vec!["last 2 versions".to_string()]);
        browser_targets.insert("PRODUCTION".to_string(), vec!["last 2 versions".to_string()]);
        Self {
            libraries: IndexMap::new(),
            externals: IndexMap::new(),
            browser_targets,
            output_dir: "./dist".to_string(),
            public_path: "../".to_string(),
            base64_inline: Base64Inline::default(),
            support_ie8: false,
            html_inject_assets: true,
            framework: Framework::React,
            react_hot_reload: false,
            use_built_ins: false,
            svg_to_react_component: false,
            use_folder_as_html_name: false,
            service_worker: ServiceWorkerConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Browser queries for `env`, looked up case-insensitively.
    pub fn browser_targets_for(&self, env: &str) -> Option<&[String]> {
        self.browser_targets
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(env))
            .map(|(_, targets)| targets.as_slice())
    }

    /// Validate the configuration for the active environment.
    pub fn validate(&self, env: &str) -> Result<(), ConfigError> {
        if self.browser_targets_for(env).is_none() {
            return Err(ConfigError::MissingBrowserTargets(env.to_string()));
        }
        if self.output_dir.trim().is_empty() {
            return Err(ConfigError::Validation("build_path must not be empty".into()));
        }
        if let Some(name) = self.libraries.keys().find(|name| name.is_empty()) {
            return Err(ConfigError::Validation(format!(
                "library name must not be empty (got '{name}')"
            )));
        }
        for (name, external) in &self.externals {
            if external.alias_name.is_none() && external.asset_path.is_none() {
                return Err(ConfigError::Validation(format!(
                    "external '{name}' declares neither alias nor path"
                )));
            }
        }
        Ok(())
    }
}

/// An external module: optionally aliased to a global, optionally copied as a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExternalDef {
    /// Global name the module resolves to at runtime (e.g. `jQuery`).
    #[serde(rename = "alias", skip_serializing_if = "Option::is_none")]
    pub alias_name: Option<String>,
    /// Pre-built file, relative to the project root, copied into `assets/`.
    #[serde(rename = "path", skip_serializing_if = "Option::is_none")]
    pub asset_path: Option<String>,
}

/// Base64 inlining of small images in production builds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Base64Inline {
    #[serde(rename = "enable")]
    pub enabled: bool,
    /// Files strictly smaller than this many bytes are inlined.
    #[serde(rename = "limit")]
    pub size_limit_bytes: u64,
}

impl Default for Base64Inline {
    fn default() -> Self {
        Self {
            enabled: true,
            size_limit_bytes: 10_000,
        }
    }
}

/// UI framework the project is written against.
///
/// Anything other than `react` is carried through verbatim as [`Framework::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Framework {
    React,
    Other(String),
}

impl Framework {
    pub fn is_react(&self) -> bool {
        matches!(self, Framework::React)
    }
}

impl From<String> for Framework {
    fn from(name: String) -> Self {
        if name.eq_ignore_ascii_case("react") {
            Framework::React
        } else {
            Framework::Other(name)
        }
    }
}

impl From<Framework> for String {
    fn from(framework: Framework) -> Self {
        match framework {
            Framework::React => "react".to_string(),
            Framework::Other(name) => name,
        }
    }
}

/// Service worker generation settings (production builds only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ServiceWorkerConfig {
    pub enable: bool,
    #[serde(alias = "filanme")]
    pub filename: String,
    pub cache_id: String,
    /// Output location of the worker script.
    pub filepath: String,
    /// Regexes of output files the worker must not precache.
    pub static_file_globs_ignore_patterns: Vec<String>,
    /// Custom scope prefix.
    pub prefix: String,
}

impl Default for ServiceWorkerConfig {
    fn default() -> Self {
        Self {
            enable: false,
            filename: "service-worker.js".to_string(),
            cache_id: "service-worker-cache".to_string(),
            filepath: "./service-worker.js".to_string(),
            static_file_globs_ignore_patterns: vec![
                "\\.*\\.html".to_string(),
                "\\.map$".to_string(),
                "sw-register.js$".to_string(),
            ],
            prefix: String::new(),
        }
    }
}

// =============================================================================
// Document loading, merging, and resolution
// =============================================================================

fn canonical_key(key: &str) -> &str {
    KEY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(key)
}

/// Merge `overlay` on top of `base`, one level deep.
///
/// - Every top-level key in overlay replaces the base value entirely.
/// - Keys in base that are not in overlay are preserved, in their original position.
/// - A `null` overlay is treated as an empty document.
pub fn merge_shallow(base: Value, overlay: Value) -> Result<Value, ConfigError> {
    let mut base_map = match base {
        Value::Object(map) => map,
        _ => {
            return Err(ConfigError::Validation(
                "base configuration must be an object".into(),
            ));
        }
    };
    let overlay_map = match overlay {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => {
            return Err(ConfigError::Validation(
                "project document must be a JSON object".into(),
            ));
        }
    };
    for (key, value) in overlay_map {
        base_map.insert(canonical_key(&key).to_string(), value);
    }
    Ok(Value::Object(base_map))
}

/// Merge a project document over `defaults`, then deserialize and validate for `env`.
///
/// Pure: the caller supplies the already-parsed document.
pub fn resolve(
    defaults: &ProjectConfig,
    overlay: &Value,
    env: &str,
) -> Result<ProjectConfig, ConfigError> {
    let base = serde_json::to_value(defaults)?;
    let merged = merge_shallow(base, overlay.clone())?;
    let config: ProjectConfig = serde_json::from_value(merged)?;
    config.validate(env)?;
    Ok(config)
}

/// Load the project document from `root` as a raw JSON value.
///
/// Returns `Ok(None)` when neither `abc.json` nor `abc.toml` exists.
pub fn load_raw_config(root: &Path) -> Result<Option<Value>, ConfigError> {
    let json_path = root.join(PROJECT_DOCUMENT);
    if json_path.exists() {
        let content = fs::read_to_string(&json_path)?;
        return Ok(Some(serde_json::from_str(&content)?));
    }
    let toml_path = root.join(PROJECT_DOCUMENT_TOML);
    if toml_path.exists() {
        let content = fs::read_to_string(&toml_path)?;
        let value: toml::Value = toml::from_str(&content)?;
        return Ok(Some(serde_json::to_value(value)?));
    }
    Ok(None)
}

/// Load and resolve the project configuration at `root` for `env`.
pub fn load_config(root: &Path, env: &str) -> Result<ProjectConfig, ConfigError> {
    let overlay = load_raw_config(root)?.unwrap_or(Value::Object(Map::new()));
    resolve(&ProjectConfig::default(), &overlay, env)
}

/// The stock configuration as a pretty-printed project document.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_json() -> Result<String, ConfigError> {
    Ok(serde_json::to_string_pretty(&ProjectConfig::default())?)
}
