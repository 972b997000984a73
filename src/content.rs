//! Content scanning and manifest generation.
//!
//! Stage 2 of the layerpress build pipeline. Walks the posts and pages
//! directories, parses front matter, renders markdown bodies to HTML, and
//! produces the [`Manifest`] the generate stage consumes.
//!
//! ## Content Structure
//!
//! ```text
//! src/
//! ├── posts/
//! │   ├── 2026-01-10-first-post.md
//! │   └── travel/2026-02-01-kyoto.md    # subdirectories are walked
//! └── pages/
//!     ├── index.md                      # rendered at the site root
//!     └── about.md
//! ```
//!
//! ## Collections
//!
//! - `allPosts`: every post, in reverse path order — with date-prefixed
//!   filenames (the expected convention) the newest post comes first.
//! - `pages`: every page, in path order.
//! - `postCollections`: posts grouped by each name in their
//!   `postCollections` front-matter list. A post with no such field is
//!   grouped nowhere but still appears in `allPosts`.
//!
//! Dotfiles and non-markdown files are skipped. A missing posts or pages
//! directory is fine — the corresponding collection is empty.

use crate::config::SiteConfig;
use crate::filters::slugify;
use crate::types::{Document, FrontMatter};
use pulldown_cmark::{Parser, html as md_html};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Front matter error in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },
}

/// Manifest output from the scan stage.
#[derive(Debug, Serialize)]
pub struct Manifest {
    /// All posts, newest-by-filename first.
    pub posts: Vec<Document>,
    /// All pages, in path order.
    pub pages: Vec<Document>,
    /// Posts grouped by `postCollections` front-matter name.
    pub collections: BTreeMap<String, Vec<Document>>,
    pub config: SiteConfig,
}

pub fn scan(root: &Path, config: &SiteConfig) -> Result<Manifest, ScanError> {
    let mut posts = collect_documents(root, &root.join(&config.paths.posts), "/posts/")?;
    posts.reverse();

    let pages = collect_documents(root, &root.join(&config.paths.pages), "/")?;

    let mut collections: BTreeMap<String, Vec<Document>> = BTreeMap::new();
    for post in &posts {
        for name in &post.data.post_collections {
            collections
                .entry(name.clone())
                .or_default()
                .push(post.clone());
        }
    }

    Ok(Manifest {
        posts,
        pages,
        collections,
        config: config.clone(),
    })
}

/// Parse every markdown file under `dir` into a document, in sorted path
/// order. A missing directory yields an empty list.
fn collect_documents(
    root: &Path,
    dir: &Path,
    url_base: &str,
) -> Result<Vec<Document>, ScanError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut documents = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_markdown(path) {
            continue;
        }
        documents.push(parse_document(root, path, url_base)?);
    }

    Ok(documents)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

fn parse_document(root: &Path, path: &Path, url_base: &str) -> Result<Document, ScanError> {
    let raw = fs::read_to_string(path)?;
    let (front, body) = split_front_matter(&raw);

    let data: FrontMatter = match front {
        Some(block) => {
            serde_yaml_ng::from_str(block).map_err(|source| ScanError::FrontMatter {
                path: path.to_path_buf(),
                source,
            })?
        }
        None => FrontMatter::default(),
    };

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let slug = slugify(&stem);

    let title = data
        .title
        .clone()
        .unwrap_or_else(|| slug.replace('-', " "));

    let url = if url_base == "/" && slug == "index" {
        "/".to_string()
    } else {
        format!("{url_base}{slug}/")
    };

    let source_path = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");

    Ok(Document {
        source_path,
        slug,
        url,
        title,
        data,
        content: render_markdown(body),
    })
}

/// Split off a leading `---` YAML front matter block. Content without one is
/// all body; an unterminated opening fence is treated as body too.
fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content.strip_prefix("---\n") else {
        return (None, content);
    };
    if let Some(end) = rest.find("\n---\n") {
        return (Some(&rest[..end]), &rest[end + 5..]);
    }
    if let Some(block) = rest.strip_suffix("\n---") {
        return (Some(block), "");
    }
    (None, content)
}

fn render_markdown(body: &str) -> String {
    let parser = Parser::new(body);
    let mut html = String::new();
    md_html::push_html(&mut html, parser);
    html
}
