//! # layerpress
//!
//! A minimal static site generator with layered theme overrides. A theme
//! ships base layouts and includes; a site author overrides individual files
//! without touching the theme sources — no forked templates, no merge
//! conflicts when pulling theme updates.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! layerpress processes a site through three sequential stages:
//!
//! ```text
//! 1. Merge     theme layers  →  .cache/{layouts,includes}
//! 2. Scan      src/          →  manifest.json   (content → structured data)
//! 3. Generate  manifest      →  _site/          (final HTML site)
//! ```
//!
//! The merge stage is the heart of the layered theme system. Base layouts are
//! copied into a cache directory twice — once at the root, once under a
//! reserved `theme/` subfolder — and user overrides are then copied over the
//! root only. A user layout that wants to build on the original it replaces
//! extends `theme/<name>`, a stable reference that no override ever touches.
//! Includes merge the same way but recursively over whole trees.
//!
//! The cache is transient derived state: rebuilt idempotently on every build,
//! never diffed, never committed. The template engine resolves every
//! `{% include %}` and `{% extends %}` against the two cache directories and
//! nothing else, so origin layer is invisible at render time.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`overlay`] | Stage 1 — merges theme layers into the cache tree |
//! | [`content`] | Stage 2 — walks posts/pages, parses front matter, builds the manifest |
//! | [`generate`] | Stage 3 — renders documents through layouts, writes the site |
//! | [`engine`] | minijinja environment bound to the merged caches |
//! | [`registry`] | Per-build filter/shortcode registry |
//! | [`filters`] | Date, excerpt, slug, URL, and collection filters |
//! | [`shortcodes`] | The carousel shortcode and its markup builder |
//! | [`config`] | `site.toml` loading and validation |
//! | [`types`] | Shared types serialized between stages |
//! | [`output`] | CLI output formatting — per-stage result display |
//!
//! # Design Decisions
//!
//! ## Copy-Merge Over Search-Path Fallback
//!
//! Override resolution could have been a runtime search path (try user dir,
//! fall back to theme dir). Materializing a merged tree instead keeps the
//! engine configuration trivial (two directories, no precedence logic at
//! render time), makes the effective template set inspectable on disk, and
//! gives user layouts a durable `theme/` namespace for extending the
//! originals they shadow.
//!
//! ## An Explicit Registry Per Build
//!
//! Filters and shortcodes live in a [`registry::Registry`] value constructed
//! for each build and installed into the engine, not in process-wide mutable
//! state. Two builds in one process cannot contaminate each other, and a
//! site binary extends the registry with plain method calls before building.
//!
//! ## Fail-Soft Content, Fail-Fast Filesystem
//!
//! Content problems degrade visibly instead of aborting: an unparseable date
//! renders as its raw text, an undefined template variable renders empty, a
//! zero-image carousel becomes an HTML comment. Filesystem problems during
//! the merge or write are the opposite — any IO error aborts the build, with
//! no partial-result salvage. A wrong-looking page is recoverable by the
//! author; a half-written cache is not.

pub mod config;
pub mod content;
pub mod engine;
pub mod filters;
pub mod generate;
pub mod output;
pub mod overlay;
pub mod registry;
pub mod shortcodes;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
