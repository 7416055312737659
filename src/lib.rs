//! # pageplan
//!
//! Computes a deterministic build plan for multi-page front-end projects.
//! The project layout decides which pages exist, `abc.json` decides how they
//! are bundled, and the result is a declarative plan (entries, chunk groups,
//! external assets, per-page HTML parameters, content-type rules) handed to an
//! external bundler.
//!
//! # Architecture: Forward Pipeline
//!
//! ```text
//! 1. Resolve   abc.json + defaults  →  ProjectConfig      (config)
//! 2. Discover  src/pages/           →  [PageDescriptor]   (discover)
//! 3. Plan      config + pages       →  BuildPlan          (plan, using rules)
//! ```
//!
//! Each stage is a plain function over immutable values. The only I/O is
//! reading the project document and listing directories; nothing is written
//! except by the CLI when asked to save a plan.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Project document loading, shallow merge over defaults, validation |
//! | [`discover`] | Flat and module-nested page discovery |
//! | [`plan`] | Entries, chunk groups, externals, HTML page parameters |
//! | [`rules`] | Development/production profiles and content-type rules |
//! | [`naming`] | Entry-key and output file naming conventions |
//! | [`types`] | Types shared between discovery and planning |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Authoring Order Is Observable
//!
//! Library and external declarations produce entry names, chunk membership and
//! script order in generated pages. Every map that feeds the plan preserves
//! insertion order (`indexmap`, `serde_json` with `preserve_order`), so the
//! same document always yields the same plan.
//!
//! ## Shallow Configuration Merge
//!
//! A top-level key in `abc.json` replaces the default outright. Projects that
//! override `base64` or `browser_support` get exactly what they wrote, with no
//! hidden leftovers from the defaults.
//!
//! ## Mode Profiles Instead of Conditionals
//!
//! Development and production differ in a handful of settings (hashing,
//! style extraction, minification, hot reload). Those live in one
//! [`rules::ModeProfile`] per mode, and everything downstream reads the
//! profile rather than testing the environment again.
//!
//! ## Fail Fast
//!
//! Missing scripts, missing ports, unknown environments and colliding entry
//! keys are authoring mistakes. They abort planning with an explanation; no
//! partial plan is ever produced.

pub mod config;
pub mod discover;
pub mod naming;
pub mod output;
pub mod plan;
pub mod rules;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
