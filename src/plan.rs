//! Build plan construction.
//!
//! Stage 3 of the pipeline. Combines the resolved [`ProjectConfig`], the
//! discovered pages, and the [`rules`](crate::rules) table into a
//! [`BuildPlan`] that a bundler can consume directly.
//!
//! ## Entries
//!
//! ```text
//! checkout/bundle.cart   ← [hot-reload bootstrap (dev only)…, src/pages/checkout/cart.js]
//! assets/vendor          ← [src/lib/react.js, src/lib/react-dom.js]
//! ```
//!
//! Development entries start with, in order: `react-hot-loader/patch` (only
//! with `reactHotReload`), the dev-server client for the given port, and the
//! hot-module bootstrap. Production entries never carry them.
//!
//! ## Chunk Groups
//!
//! Each library is pinned as its own artifact (`minSharedUses = "always"`).
//! When at least one library exists, a final `commonLibs` group collects code
//! shared by every page entry.
//!
//! ## Failure
//!
//! Construction is all-or-nothing: a missing port, missing browser targets, or
//! a colliding entry key or HTML output aborts before any plan is returned.

use crate::config::{self, ConfigError, ProjectConfig, ServiceWorkerConfig};
use crate::discover::{self, DiscoverError};
use crate::naming::{self, ASSETS_DIR, COMMON_CHUNK};
use crate::rules::{self, AssetRule, BuildMode};
use crate::types::PageDescriptor;
use indexmap::{IndexMap, IndexSet};
use log::{debug, info};
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

const REACT_HOT_PATCH: &str = "react-hot-loader/patch";
const DEV_SERVER_CLIENT: &str = "webpack-dev-server/client?http://localhost:";
const HOT_BOOTSTRAP: &str = "webpack/hot/dev-server";

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Discovery error: {0}")]
    Discover(#[from] DiscoverError),
    #[error("Duplicate entry key '{0}'")]
    DuplicateEntry(String),
    /// Two pages render to the same file, e.g. several pages in one module
    /// with `useFolderAsHtmlName`.
    #[error("Duplicate HTML output '{0}' (useFolderAsHtmlName allows one page per module)")]
    DuplicateHtmlFilename(String),
}

/// Project paths and process environment the plan is computed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// Project root; externals and the output directory are relative to it.
    pub root: PathBuf,
    /// Library sources are relative to this directory.
    pub source_dir: PathBuf,
    /// Value forwarded as `process.env.NODE_ENV`.
    pub node_env: Option<String>,
    /// Value forwarded as `process.env.DEBUG`.
    pub debug: Option<String>,
}

impl Workspace {
    /// Workspace rooted at `root` with sources under `root/src`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let source_dir = root.join("src");
        Self {
            root,
            source_dir,
            node_env: None,
            debug: None,
        }
    }

    pub fn with_process_env(mut self, node_env: Option<String>, debug: Option<String>) -> Self {
        self.node_env = node_env;
        self.debug = debug;
        self
    }
}

/// The complete, bundler-facing description of one build.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPlan {
    pub mode: BuildMode,
    pub entries: Vec<EntryPlan>,
    pub chunk_groups: Vec<ChunkGroup>,
    pub external_assets: Vec<CopyInstruction>,
    /// Output references prepended to every generated page.
    pub injected_assets: Vec<String>,
    /// Module name → runtime global, resolved without bundling.
    pub aliases: IndexMap<String, String>,
    pub html_pages: Vec<HtmlPage>,
    pub output: OutputSettings,
    pub asset_rules: Vec<AssetRule>,
    pub source_map: String,
    pub hot_module_replacement: bool,
    /// Compile-time constants, values are JavaScript literals.
    pub defines: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_worker: Option<ServiceWorkerConfig>,
}

impl BuildPlan {
    /// Entry map in plan order: key → source list.
    pub fn entry_map(&self) -> IndexMap<&str, &[String]> {
        self.entries
            .iter()
            .map(|e| (e.entry_key.as_str(), e.source_files.as_slice()))
            .collect()
    }

    pub fn entry(&self, key: &str) -> Option<&EntryPlan> {
        self.entries.iter().find(|e| e.entry_key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPlan {
    pub entry_key: String,
    /// Bootstrap module specifiers (dev only) followed by real source paths.
    pub source_files: Vec<String>,
}

/// Entries whose shared code is extracted into one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkGroup {
    pub group_name: String,
    pub member_entry_keys: IndexSet<String>,
    pub min_shared_uses: MinSharedUses,
}

/// How many entries must share a module before it moves into the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinSharedUses {
    /// Extract regardless of share count.
    Always,
    /// Extract modules shared by at least `n` entries. Part of the plan model
    /// for bundler configs that need it; [`build_plan`] only emits `Always`.
    AtLeast(u32),
}

impl Serialize for MinSharedUses {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MinSharedUses::Always => serializer.serialize_str("always"),
            MinSharedUses::AtLeast(n) => serializer.serialize_u32(*n),
        }
    }
}

/// Copy a pre-built file verbatim into the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyInstruction {
    pub from: PathBuf,
    /// Destination directory.
    pub to: PathBuf,
}

/// Parameters for the HTML-templating collaborator, one per page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HtmlPage {
    pub filename: String,
    pub template: PathBuf,
    /// Chunks included in the page, in load order.
    pub chunks: Vec<String>,
    pub minify: bool,
    pub inject: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSettings {
    pub path: PathBuf,
    pub public_path: String,
    pub filename: String,
}

/// Tracks claimed entry keys; a second claim is a [`PlanError::DuplicateEntry`].
#[derive(Default)]
struct KeyRegistry {
    claimed: HashSet<String>,
}

impl KeyRegistry {
    fn claim(&mut self, key: &str) -> Result<(), PlanError> {
        if self.claimed.insert(key.to_string()) {
            Ok(())
        } else {
            Err(PlanError::DuplicateEntry(key.to_string()))
        }
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// JavaScript literal for an optional string: a JSON string, or `undefined`.
fn define_literal(value: Option<&str>) -> String {
    match value {
        Some(v) => serde_json::Value::String(v.to_string()).to_string(),
        None => "undefined".to_string(),
    }
}

fn dev_bootstrap(config: &ProjectConfig, port: u16) -> Vec<String> {
    let mut entries = Vec::with_capacity(3);
    if config.react_hot_reload {
        entries.push(REACT_HOT_PATCH.to_string());
    }
    entries.push(format!("{DEV_SERVER_CLIENT}{port}"));
    entries.push(HOT_BOOTSTRAP.to_string());
    entries
}

/// Build the plan for `pages` under `config` in environment `env`.
///
/// `dev_server_port` is required when `env` is `development`.
pub fn build_plan(
    config: &ProjectConfig,
    pages: &[PageDescriptor],
    env: &str,
    dev_server_port: Option<u16>,
    workspace: &Workspace,
) -> Result<BuildPlan, PlanError> {
    let mode = BuildMode::from_env(env);
    let profile = mode.profile();
    let browser_targets = config
        .browser_targets_for(env)
        .ok_or_else(|| ConfigError::MissingBrowserTargets(env.to_string()))?;

    let bootstrap = if profile.hot_reload {
        let port = dev_server_port.ok_or(ConfigError::MissingDevServerPort)?;
        dev_bootstrap(config, port)
    } else {
        Vec::new()
    };

    let mut registry = KeyRegistry::default();
    let has_libraries = !config.libraries.is_empty();
    if has_libraries {
        registry.claim(COMMON_CHUNK)?;
    }

    // Pages
    let mut entries = Vec::with_capacity(pages.len() + config.libraries.len());
    let mut page_keys = IndexSet::new();
    for page in pages {
        let key = page.entry_key();
        registry.claim(&key)?;
        let mut source_files = bootstrap.clone();
        source_files.push(path_string(&page.script_path));
        entries.push(EntryPlan {
            entry_key: key.clone(),
            source_files,
        });
        page_keys.insert(key);
    }

    // Libraries, each pinned as its own chunk
    let mut chunk_groups = Vec::with_capacity(config.libraries.len() + 1);
    let mut library_keys = Vec::with_capacity(config.libraries.len());
    for (name, files) in &config.libraries {
        let key = naming::library_entry_key(name);
        registry.claim(&key)?;
        entries.push(EntryPlan {
            entry_key: key.clone(),
            source_files: files
                .iter()
                .map(|f| path_string(&workspace.source_dir.join(f)))
                .collect(),
        });
        chunk_groups.push(ChunkGroup {
            group_name: key.clone(),
            member_entry_keys: IndexSet::from([key.clone()]),
            min_shared_uses: MinSharedUses::Always,
        });
        library_keys.push(key);
    }
    if has_libraries {
        chunk_groups.push(ChunkGroup {
            group_name: COMMON_CHUNK.to_string(),
            member_entry_keys: page_keys,
            min_shared_uses: MinSharedUses::Always,
        });
    }

    // Externals
    let output_path = workspace.root.join(&config.output_dir);
    let mut external_assets = Vec::new();
    let mut injected_assets = Vec::new();
    let mut aliases = IndexMap::new();
    for (name, external) in &config.externals {
        if let Some(asset_path) = &external.asset_path {
            external_assets.push(CopyInstruction {
                from: workspace.root.join(asset_path),
                to: output_path.join(ASSETS_DIR),
            });
            if let Some(reference) = naming::asset_reference(asset_path) {
                injected_assets.push(reference);
            }
        }
        if let Some(alias) = &external.alias_name {
            aliases.insert(name.clone(), alias.clone());
        }
    }

    // Pages' HTML: libraries, then the shared chunk, then the page itself
    let mut shared_chunks = library_keys;
    if has_libraries {
        shared_chunks.push(COMMON_CHUNK.to_string());
    }
    let mut html_filenames = HashSet::with_capacity(pages.len());
    let mut html_pages = Vec::with_capacity(pages.len());
    for page in pages {
        let filename = page.html_filename(config.use_folder_as_html_name);
        if !html_filenames.insert(filename.clone()) {
            return Err(PlanError::DuplicateHtmlFilename(filename));
        }
        let mut chunks = shared_chunks.clone();
        chunks.push(page.entry_key());
        html_pages.push(HtmlPage {
            filename,
            template: page.template_path.clone(),
            chunks,
            minify: profile.minify,
            inject: config.html_inject_assets,
        });
    }

    let mut defines = IndexMap::new();
    defines.insert(
        "process.env.NODE_ENV".to_string(),
        define_literal(workspace.node_env.as_deref()),
    );
    defines.insert(
        "process.env.DEBUG".to_string(),
        define_literal(workspace.debug.as_deref()),
    );

    let service_worker = (!mode.is_development() && config.service_worker.enable)
        .then(|| config.service_worker.clone());

    debug!(
        "{} entries, {} chunk groups, {} external assets",
        entries.len(),
        chunk_groups.len(),
        external_assets.len()
    );

    Ok(BuildPlan {
        mode,
        entries,
        chunk_groups,
        external_assets,
        injected_assets,
        aliases,
        html_pages,
        output: OutputSettings {
            path: output_path,
            public_path: config.public_path.clone(),
            filename: profile.script_filename.to_string(),
        },
        asset_rules: rules::asset_rules(config, mode, browser_targets),
        source_map: profile.source_map.to_string(),
        hot_module_replacement: profile.hot_reload,
        defines,
        service_worker,
    })
}

/// Run the whole pipeline for a project: load config, discover pages, build the plan.
pub fn plan_project(
    workspace: &Workspace,
    page_root: &Path,
    nested: bool,
    env: &str,
    dev_server_port: Option<u16>,
) -> Result<BuildPlan, PlanError> {
    let config = config::load_config(&workspace.root, env)?;
    let pages = discover::discover(page_root, nested)?;
    let plan = build_plan(&config, &pages, env, dev_server_port, workspace)?;
    info!(
        "planned {} page(s) and {} librar{} for {env}",
        pages.len(),
        config.libraries.len(),
        if config.libraries.len() == 1 { "y" } else { "ies" }
    );
    Ok(plan)
}
