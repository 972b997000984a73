//! HTML site generation.
//!
//! Stage 3 of the layerpress build pipeline. Renders every post and page
//! through its layout via the merged template caches and writes the final
//! static site, then copies passthrough asset directories unmodified.
//!
//! ## Output Structure
//!
//! ```text
//! _site/
//! ├── index.html                 # src/pages/index.md
//! ├── about/index.html           # src/pages/about.md
//! ├── posts/
//! │   └── hello-world/index.html # src/posts/hello-world.md
//! └── assets/...                 # passthrough copy of src/assets
//! ```
//!
//! ## Template Context
//!
//! Each document renders with its front-matter keys exposed as top-level
//! variables (so shortcodes and templates can reach `carousels`, `tags`,
//! custom keys directly) plus:
//!
//! - `content`: the rendered markdown body
//! - `page`: the whole document (`page.url`, `page.data.…`)
//! - `site`: metadata from `site.toml`
//! - `collections`: `allPosts`, `pages`, and the `postCollections` groups
//! - `path_prefix`: the effective deployment prefix

use crate::config;
use crate::content::Manifest;
use crate::engine;
use crate::overlay::{self, LayerPaths};
use crate::registry::Registry;
use crate::types::Document;
use serde_json::json;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Template error in {path}: {source}")]
    Template {
        path: String,
        source: minijinja::Error,
    },
}

/// What a generate run produced, for CLI output.
#[derive(Debug, Default)]
pub struct GenerateSummary {
    /// `(title, output path)` per rendered post.
    pub posts: Vec<(String, String)>,
    /// `(title, output path)` per rendered page.
    pub pages: Vec<(String, String)>,
    /// Passthrough directories copied, as `(source, file count)`.
    pub passthrough: Vec<(String, usize)>,
}

pub fn generate(
    manifest: &Manifest,
    root: &Path,
    layers: &LayerPaths,
    output_dir: &Path,
    registry: &Registry,
) -> Result<GenerateSummary, GenerateError> {
    let env = engine::build_environment(layers, registry);
    let prefix = config::effective_path_prefix(&manifest.config);
    let collections = collections_context(manifest)?;

    fs::create_dir_all(output_dir)?;
    let mut summary = GenerateSummary::default();

    for post in &manifest.posts {
        let out_rel = format!("posts/{}/index.html", post.slug);
        render_document(&env, manifest, post, &collections, &prefix, output_dir, &out_rel)?;
        summary.posts.push((post.title.clone(), out_rel));
    }

    for page in &manifest.pages {
        let out_rel = if page.slug == "index" {
            "index.html".to_string()
        } else {
            format!("{}/index.html", page.slug)
        };
        render_document(&env, manifest, page, &collections, &prefix, output_dir, &out_rel)?;
        summary.pages.push((page.title.clone(), out_rel));
    }

    summary.passthrough = copy_passthrough(manifest, root, output_dir)?;

    Ok(summary)
}

#[allow(clippy::too_many_arguments)]
fn render_document(
    env: &minijinja::Environment<'_>,
    manifest: &Manifest,
    doc: &Document,
    collections: &serde_json::Value,
    prefix: &str,
    output_dir: &Path,
    out_rel: &str,
) -> Result<(), GenerateError> {
    let layout = doc
        .data
        .layout
        .clone()
        .unwrap_or_else(|| manifest.config.default_layout.clone());

    let ctx = template_context(doc, manifest, collections, prefix)?;
    let html = env
        .get_template(&layout)
        .and_then(|t| t.render(minijinja::Value::from_serialize(&ctx)))
        .map_err(|source| GenerateError::Template {
            path: doc.source_path.clone(),
            source,
        })?;

    let out_path = output_dir.join(out_rel);
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&out_path, html)?;
    Ok(())
}

/// The per-document render context. Front-matter keys come first so the
/// named keys below always win on collision.
fn template_context(
    doc: &Document,
    manifest: &Manifest,
    collections: &serde_json::Value,
    prefix: &str,
) -> Result<serde_json::Map<String, serde_json::Value>, GenerateError> {
    let mut ctx = serde_json::Map::new();

    for (key, value) in &doc.data.extra {
        ctx.insert(key.clone(), serde_json::to_value(value)?);
    }
    ctx.insert("title".into(), json!(doc.title));
    ctx.insert("date".into(), serde_json::to_value(&doc.data.date)?);
    ctx.insert("tags".into(), serde_json::to_value(&doc.data.tags)?);
    ctx.insert(
        "postCollections".into(),
        serde_json::to_value(&doc.data.post_collections)?,
    );
    ctx.insert("carousels".into(), serde_json::to_value(&doc.data.carousels)?);

    ctx.insert("content".into(), json!(doc.content));
    ctx.insert("page".into(), serde_json::to_value(doc)?);
    ctx.insert("site".into(), serde_json::to_value(&manifest.config.site)?);
    ctx.insert("collections".into(), collections.clone());
    ctx.insert("path_prefix".into(), json!(prefix));

    Ok(ctx)
}

fn collections_context(manifest: &Manifest) -> Result<serde_json::Value, GenerateError> {
    Ok(json!({
        "allPosts": manifest.posts,
        "pages": manifest.pages,
        "postCollections": manifest.collections,
    }))
}

/// Copy passthrough asset directories into the output root. Targets under
/// the source root land with that prefix stripped (`src/assets` → `assets`);
/// a missing target directory is skipped.
fn copy_passthrough(
    manifest: &Manifest,
    root: &Path,
    output_dir: &Path,
) -> Result<Vec<(String, usize)>, GenerateError> {
    let source_prefix = format!("{}/", manifest.config.paths.source);
    let mut copied = Vec::new();

    for target in &manifest.config.passthrough_copy {
        let src = root.join(target);
        if !src.is_dir() {
            continue;
        }
        let dest_rel = target.strip_prefix(&source_prefix).unwrap_or(target);
        let files = overlay::copy_dir_recursive(&src, &output_dir.join(dest_rel))?;
        copied.push((target.clone(), files.len()));
    }

    Ok(copied)
}
