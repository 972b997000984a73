//! Site configuration module.
//!
//! Handles loading and validating `site.toml` from the project root. All
//! options have defaults matching the conventional directory layout, so a
//! config file is optional and sparse — override just the values you want.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! path_prefix = "/"            # URL prefix for non-root deployments
//! default_layout = "base.njk"  # Layout used when front matter names none
//!
//! # Static asset directories copied unmodified into the output
//! passthrough_copy = ["src/assets", "src/media", "src/_user/assets"]
//!
//! [site]
//! title = "A layerpress site"  # Exposed to templates as site.title etc.
//! description = ""
//! author = ""
//! url = ""
//!
//! [paths]
//! source = "src"                        # Content source root
//! base_layouts = "src/_layouts"         # Theme layouts
//! user_layouts = "src/_user/layouts"    # Layout overrides
//! base_includes = "src/_includes"       # Theme includes
//! user_includes = "src/_user/includes"  # Include overrides
//! posts = "src/posts"                   # Blog posts
//! pages = "src/pages"                   # Standalone pages
//! ```
//!
//! ## Path Prefix
//!
//! For project-page hosting (e.g. serving under `/blog/`), set `path_prefix`
//! or the `LAYERPRESS_PATH_PREFIX` environment variable; the environment
//! variable wins. The `url` filter and the carousel shortcode rewrite
//! root-relative links with it. `/` (the default) means no rewriting.
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Environment variable overriding the configured path prefix.
pub const PATH_PREFIX_ENV: &str = "LAYERPRESS_PATH_PREFIX";

/// Site configuration loaded from `site.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// URL prefix for non-root deployment; `/` disables rewriting.
    pub path_prefix: String,
    /// Layout used for documents whose front matter names none.
    pub default_layout: String,
    /// Directories copied unmodified into the output root.
    pub passthrough_copy: Vec<String>,
    /// Site metadata exposed to templates as `site`.
    pub site: SiteMeta,
    /// Directory layout, relative to the project root.
    pub paths: PathsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            path_prefix: "/".to_string(),
            default_layout: "base.njk".to_string(),
            passthrough_copy: vec![
                "src/assets".to_string(),
                "src/media".to_string(),
                "src/_user/assets".to_string(),
            ],
            site: SiteMeta::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.path_prefix.starts_with('/') {
            return Err(ConfigError::Validation(
                "path_prefix must start with '/'".into(),
            ));
        }
        if self.default_layout.is_empty() {
            return Err(ConfigError::Validation(
                "default_layout must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Site metadata exposed to templates as `site`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "A layerpress site".to_string(),
            description: String::new(),
            author: String::new(),
            url: String::new(),
        }
    }
}

/// Directory layout, relative to the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Content source root; passthrough targets under it are copied to the
    /// same path with this prefix stripped (`src/assets` → `assets`).
    pub source: String,
    pub base_layouts: String,
    pub user_layouts: String,
    pub base_includes: String,
    pub user_includes: String,
    pub posts: String,
    pub pages: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: "src".to_string(),
            base_layouts: "src/_layouts".to_string(),
            user_layouts: "src/_user/layouts".to_string(),
            base_includes: "src/_includes".to_string(),
            user_includes: "src/_user/includes".to_string(),
            posts: "src/posts".to_string(),
            pages: "src/pages".to_string(),
        }
    }
}

/// Load `site.toml` from the project root, falling back to defaults when the
/// file doesn't exist.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = root.join("site.toml");
    let config = if config_path.exists() {
        let content = fs::read_to_string(&config_path)?;
        toml::from_str(&content)?
    } else {
        SiteConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Resolve the effective path prefix: the `LAYERPRESS_PATH_PREFIX`
/// environment variable when set and non-empty, else the configured value.
pub fn effective_path_prefix(config: &SiteConfig) -> String {
    std::env::var(PATH_PREFIX_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| config.path_prefix.clone())
}

/// A documented stock `site.toml` with all options and their defaults.
pub fn stock_config_toml() -> String {
    r#"# layerpress site configuration
# All options are optional - the values below are the defaults.

# URL prefix for non-root deployment (e.g. "/blog/" for project pages).
# "/" means no rewriting. The LAYERPRESS_PATH_PREFIX environment variable
# overrides this value.
path_prefix = "/"

# Layout used for documents whose front matter names none.
default_layout = "base.njk"

# Static asset directories copied unmodified into the output. Paths under
# the source root are copied with that prefix stripped (src/assets -> assets).
passthrough_copy = ["src/assets", "src/media", "src/_user/assets"]

[site]
# Metadata exposed to templates as site.title, site.description, etc.
title = "A layerpress site"
description = ""
author = ""
url = ""

[paths]
# Directory layout, relative to the project root.
source = "src"
base_layouts = "src/_layouts"         # Theme layouts
user_layouts = "src/_user/layouts"    # Your layout overrides
base_includes = "src/_includes"       # Theme includes
user_includes = "src/_user/includes"  # Your include overrides
posts = "src/posts"
pages = "src/pages"
"#
    .to_string()
}
