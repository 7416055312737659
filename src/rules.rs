//! Content-type rules attached to every build plan.
//!
//! Everything that differs between development and production lives in one
//! [`ModeProfile`] per [`BuildMode`]. Rule construction reads the profile
//! uniformly instead of branching per rule:
//!
//! | | development | production |
//! |---|---|---|
//! | scripts | `[name].js` | `[name].[chunkhash:8].js` |
//! | styles | injected into the page | extracted to `[name].[contenthash:8].css` |
//! | images | `[name].[ext]` | `[name].[hash:8].[ext]`, base64 inlining, optimizer |
//! | html | as authored | minified, comments stripped |
//! | source maps | `cheap-module-source-map` | `source-map` |
//!
//! The resulting rules are declarative descriptions handed to the bundler;
//! nothing here transforms files.

use crate::config::ProjectConfig;
use crate::naming::ASSETS_DIR;
use serde::Serialize;

/// Build mode derived from the environment name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Development,
    Production,
}

impl BuildMode {
    /// `development` (any case) is development; every other environment builds for production.
    pub fn from_env(env: &str) -> Self {
        if env.eq_ignore_ascii_case("development") {
            BuildMode::Development
        } else {
            BuildMode::Production
        }
    }

    pub fn is_development(self) -> bool {
        self == BuildMode::Development
    }

    pub fn profile(self) -> &'static ModeProfile {
        match self {
            BuildMode::Development => &DEVELOPMENT,
            BuildMode::Production => &PRODUCTION,
        }
    }
}

/// Per-mode settings consumed by the rule table and the plan builder.
#[derive(Debug, PartialEq, Eq)]
pub struct ModeProfile {
    /// Prepend hot-reload bootstrap entries to pages.
    pub hot_reload: bool,
    pub script_filename: &'static str,
    /// `None` injects styles at runtime; `Some` extracts them to this file pattern.
    pub extracted_style_filename: Option<&'static str>,
    pub asset_filename: &'static str,
    /// Whether base64 inlining (when enabled in config) applies.
    pub inline_images: bool,
    pub optimize_images: bool,
    pub minify: bool,
    pub source_map: &'static str,
}

const DEVELOPMENT: ModeProfile = ModeProfile {
    hot_reload: true,
    script_filename: "[name].js",
    extracted_style_filename: None,
    asset_filename: "[name].[ext]",
    inline_images: false,
    optimize_images: false,
    minify: false,
    source_map: "cheap-module-source-map",
};

const PRODUCTION: ModeProfile = ModeProfile {
    hot_reload: false,
    script_filename: "[name].[chunkhash:8].js",
    extracted_style_filename: Some("[name].[contenthash:8].css"),
    asset_filename: "[name].[hash:8].[ext]",
    inline_images: true,
    optimize_images: true,
    minify: true,
    source_map: "source-map",
};

const SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx"];
const STYLE_EXTENSIONS: &[&str] = &["css", "less"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];
const SVG_EXTENSION: &str = "svg";
const MISC_EXTENSIONS: &[&str] = &[
    "swf", "xls", "xlsx", "txt", "doc", "docx", "ppt", "pptx", "ico", "cur",
];
const MISC_FILENAME: &str = "[name].[ext]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Script,
    Style,
    Image,
    Svg,
    Html,
    Misc,
}

/// One content-type rule: which files it matches and how the bundler treats them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRule {
    pub kind: AssetKind,
    pub extensions: Vec<String>,
    /// Path fragments excluded from the rule.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    pub handling: Handling,
}

/// Where an emitted file lands and how pages reference it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmittedFile {
    pub filename: String,
    pub output_path: String,
    pub public_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Handling {
    /// Transpile for the given browser targets.
    Transpile {
        browser_targets: Vec<String>,
        use_built_ins: bool,
        react: bool,
        dynamic_import: bool,
        /// Restrict output to ES3 syntax.
        #[serde(rename = "supportIE8")]
        support_ie8: bool,
    },
    /// Inject styles into the page at runtime.
    InjectStyle {
        minify: bool,
        autoprefix: Vec<String>,
    },
    /// Extract styles into standalone files.
    ExtractStyle {
        filename: String,
        minify: bool,
        autoprefix: Vec<String>,
    },
    /// Emit the file, optionally inlining it as base64 below `inline_limit` bytes.
    Emit {
        file: EmittedFile,
        #[serde(skip_serializing_if = "Option::is_none")]
        inline_limit: Option<u64>,
        optimize: bool,
    },
    /// Compile to a UI component.
    Component,
    Markup {
        minify: bool,
        remove_comments: bool,
    },
}

/// Public path of emitted assets: `../` → `../assets/`.
pub fn asset_public_path(public_path: &str) -> String {
    format!("{}/{ASSETS_DIR}/", public_path.trim_end_matches('/'))
}

fn extensions(list: &[&str]) -> Vec<String> {
    list.iter().map(|e| e.to_string()).collect()
}

/// Build the rule table for `mode`.
///
/// `browser_targets` are the active environment's queries (see
/// [`ProjectConfig::browser_targets_for`]).
pub fn asset_rules(
    config: &ProjectConfig,
    mode: BuildMode,
    browser_targets: &[String],
) -> Vec<AssetRule> {
    let profile = mode.profile();
    let public_path = asset_public_path(&config.public_path);
    let output_path = format!("{ASSETS_DIR}/");
    let svg_as_component = config.svg_to_react_component && config.framework.is_react();

    let style_handling = match profile.extracted_style_filename {
        Some(filename) => Handling::ExtractStyle {
            filename: filename.to_string(),
            minify: profile.minify,
            autoprefix: browser_targets.to_vec(),
        },
        None => Handling::InjectStyle {
            minify: profile.minify,
            autoprefix: browser_targets.to_vec(),
        },
    };

    let inline_limit = (profile.inline_images && config.base64_inline.enabled)
        .then_some(config.base64_inline.size_limit_bytes);

    let mut image_extensions = extensions(IMAGE_EXTENSIONS);
    if !svg_as_component {
        image_extensions.push(SVG_EXTENSION.to_string());
    }

    let mut rules = vec![
        AssetRule {
            kind: AssetKind::Script,
            extensions: extensions(SCRIPT_EXTENSIONS),
            exclude: vec!["node_modules".to_string()],
            handling: Handling::Transpile {
                browser_targets: browser_targets.to_vec(),
                use_built_ins: config.use_built_ins,
                react: config.framework.is_react(),
                dynamic_import: true,
                support_ie8: config.support_ie8,
            },
        },
        AssetRule {
            kind: AssetKind::Style,
            extensions: extensions(STYLE_EXTENSIONS),
            exclude: Vec::new(),
            handling: style_handling,
        },
        AssetRule {
            kind: AssetKind::Image,
            extensions: image_extensions,
            exclude: Vec::new(),
            handling: Handling::Emit {
                file: EmittedFile {
                    filename: profile.asset_filename.to_string(),
                    output_path: output_path.clone(),
                    public_path: public_path.clone(),
                },
                inline_limit,
                optimize: profile.optimize_images,
            },
        },
    ];

    if svg_as_component {
        rules.push(AssetRule {
            kind: AssetKind::Svg,
            extensions: vec![SVG_EXTENSION.to_string()],
            exclude: Vec::new(),
            handling: Handling::Component,
        });
    }

    rules.push(AssetRule {
        kind: AssetKind::Html,
        extensions: vec!["html".to_string()],
        exclude: Vec::new(),
        handling: Handling::Markup {
            minify: profile.minify,
            remove_comments: profile.minify,
        },
    });
    rules.push(AssetRule {
        kind: AssetKind::Misc,
        extensions: extensions(MISC_EXTENSIONS),
        exclude: Vec::new(),
        handling: Handling::Emit {
            file: EmittedFile {
                filename: MISC_FILENAME.to_string(),
                output_path,
                public_path,
            },
            inline_limit: None,
            optimize: false,
        },
    });

    rules
}
