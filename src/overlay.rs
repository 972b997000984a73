//! Layered theme merging.
//!
//! Stage 1 of the layerpress build pipeline. A theme ships base layouts and
//! includes; a site author overrides individual files without touching the
//! theme sources. Before anything renders, the layers are merged into a cache
//! directory tree that the template engine reads exclusively:
//!
//! ```text
//! src/_layouts/            # Base layouts (theme, tracked in git)
//! src/_user/layouts/       # User overrides (tracked in git)
//! src/_includes/           # Base includes
//! src/_user/includes/      # User include overrides
//!         │
//!         ▼  merge_layers()
//! .cache/layouts/          # base files, then user files on top
//! .cache/layouts/theme/    # pristine base copies, never overwritten
//! .cache/includes/         # base tree, then user tree on top
//! ```
//!
//! No source file is ever modified; the cache tree is transient derived state,
//! rebuilt from scratch on every build and excluded from version control.
//!
//! ## Merge Phases
//!
//! The merge runs five sequential phases, each a precondition for the next:
//!
//! 1. Ensure both cache roots exist.
//! 2. Seed base layouts into the cache root **and** into the reserved `theme/`
//!    subfolder. The `theme/` copies give user layouts a stable name to extend
//!    (`{% extends "theme/base.njk" %}`) that survives step 3.
//! 3. Copy user layout overrides into the cache root only — never into
//!    `theme/`. Same filename wins: user content replaces base content.
//! 4. Recursively seed the base includes tree into the includes cache.
//! 5. Recursively copy user include overrides on top.
//!
//! Layout phases copy direct files only and never walk subdirectories; the
//! includes phases merge full trees. A missing source directory makes its
//! phase a no-op — a theme without layouts or a site without overrides is
//! valid. Any real filesystem error aborts the build.
//!
//! Entries whose name starts with `.` are excluded everywhere, so placeholder
//! files like `.gitkeep` can hold otherwise-empty layer directories in git
//! without becoming overrides.
//!
//! Repeated merges are idempotent: files are overwritten, never diffed, and
//! nothing is deleted — a file present only in the cache survives until the
//! cache directory itself is removed.

use crate::config::SiteConfig;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reserved layout subfolder holding pristine base copies.
pub const THEME_DIR: &str = "theme";

/// Resolved source and cache directories for one build.
#[derive(Debug, Clone)]
pub struct LayerPaths {
    pub base_layouts: PathBuf,
    pub user_layouts: PathBuf,
    pub base_includes: PathBuf,
    pub user_includes: PathBuf,
    pub cache_layouts: PathBuf,
    pub cache_includes: PathBuf,
}

impl LayerPaths {
    /// Resolve layer directories from config, relative to the project root
    /// and the cache root.
    pub fn new(root: &Path, cache_dir: &Path, config: &SiteConfig) -> Self {
        Self {
            base_layouts: root.join(&config.paths.base_layouts),
            user_layouts: root.join(&config.paths.user_layouts),
            base_includes: root.join(&config.paths.base_includes),
            user_includes: root.join(&config.paths.user_includes),
            cache_layouts: cache_dir.join("layouts"),
            cache_includes: cache_dir.join("includes"),
        }
    }
}

/// What a merge run did: seed counts plus every override that was applied.
///
/// The override lists drive the operator-visible build output — overriding a
/// theme file is deliberate but easy to forget, so each application is shown.
#[derive(Debug, Default, Serialize)]
pub struct MergeReport {
    /// Base layout files copied to the cache root and `theme/`.
    pub layouts_seeded: usize,
    /// User layout filenames applied over base layouts.
    pub layout_overrides: Vec<String>,
    /// Files copied from the base includes tree.
    pub includes_seeded: usize,
    /// User include paths (relative) applied over base includes.
    pub include_overrides: Vec<String>,
}

/// Merge all theme layers into the cache tree.
///
/// Idempotent; safe to run before every build. Not safe to run concurrently
/// against the same cache directory — the build process owns the cache for
/// the duration of a build.
pub fn merge_layers(paths: &LayerPaths) -> Result<MergeReport, OverlayError> {
    let mut report = MergeReport::default();

    // Phase 1: cache roots
    fs::create_dir_all(&paths.cache_layouts)?;
    fs::create_dir_all(&paths.cache_includes)?;

    // Phase 2: base layouts → cache root + theme/ reference copies.
    // Direct files only; subdirectories of the base layouts dir are not
    // walked, and the reserved `theme` name is never a source.
    if paths.base_layouts.is_dir() {
        let theme_dir = paths.cache_layouts.join(THEME_DIR);
        fs::create_dir_all(&theme_dir)?;

        for entry in visible_entries(&paths.base_layouts)? {
            if entry.is_file() {
                let name = file_name(&entry);
                fs::copy(&entry, paths.cache_layouts.join(&name))?;
                fs::copy(&entry, theme_dir.join(&name))?;
                report.layouts_seeded += 1;
            }
        }
    }

    // Phase 3: user layout overrides → cache root only, never theme/
    if paths.user_layouts.is_dir() {
        for entry in visible_entries(&paths.user_layouts)? {
            if entry.is_file() {
                let name = file_name(&entry);
                fs::copy(&entry, paths.cache_layouts.join(&name))?;
                report.layout_overrides.push(name);
            }
        }
    }

    // Phase 4: base includes, full tree
    if paths.base_includes.is_dir() {
        report.includes_seeded = copy_dir_recursive(&paths.base_includes, &paths.cache_includes)?.len();
    }

    // Phase 5: user include overrides, full tree on top
    if paths.user_includes.is_dir() {
        report.include_overrides = copy_dir_recursive(&paths.user_includes, &paths.cache_includes)?;
    }

    Ok(report)
}

/// Direct children of a directory, sorted, with dotfiles excluded.
pub fn visible_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .map(|n| !n.to_string_lossy().starts_with('.'))
                .unwrap_or(false)
        })
        .collect();

    entries.sort();
    Ok(entries)
}

/// Copy a directory tree, preserving relative structure and skipping dotfiles
/// at every level. Destination directories are created on demand; files are
/// overwritten in full. Nothing is ever deleted from the destination, so
/// successive copies from multiple layers are additive.
///
/// Returns the relative paths of all files copied, in traversal order.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<Vec<String>> {
    let mut copied = Vec::new();
    copy_tree(src, dst, Path::new(""), &mut copied)?;
    Ok(copied)
}

fn copy_tree(
    src: &Path,
    dst: &Path,
    rel: &Path,
    copied: &mut Vec<String>,
) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;

    for entry in visible_entries(src)? {
        let name = file_name(&entry);
        let dst_path = dst.join(&name);
        let rel_path = rel.join(&name);

        if entry.is_dir() {
            copy_tree(&entry, &dst_path, &rel_path, copied)?;
        } else if entry.is_file() {
            fs::copy(&entry, &dst_path)?;
            copied.push(rel_path.to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{layer_paths, read_to_string, write_file};
    use tempfile::TempDir;

    fn base_only_site() -> (TempDir, LayerPaths) {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "src/_layouts/base.njk", "<html>base</html>");
        write_file(tmp.path(), "src/_layouts/post.njk", "<article>base post</article>");
        write_file(tmp.path(), "src/_includes/header.njk", "<header>base</header>");
        write_file(tmp.path(), "src/_includes/partials/nav.njk", "<nav>base</nav>");
        let paths = layer_paths(tmp.path());
        (tmp, paths)
    }

    #[test]
    fn base_only_merge_mirrors_base_tree() {
        let (tmp, paths) = base_only_site();
        let report = merge_layers(&paths).unwrap();

        assert_eq!(report.layouts_seeded, 2);
        assert!(report.layout_overrides.is_empty());
        assert_eq!(report.includes_seeded, 2);
        assert!(report.include_overrides.is_empty());

        assert_eq!(
            read_to_string(tmp.path(), ".cache/layouts/base.njk"),
            "<html>base</html>"
        );
        assert_eq!(
            read_to_string(tmp.path(), ".cache/includes/partials/nav.njk"),
            "<nav>base</nav>"
        );
    }

    #[test]
    fn base_layouts_copied_to_theme_subfolder() {
        let (tmp, paths) = base_only_site();
        merge_layers(&paths).unwrap();

        assert_eq!(
            read_to_string(tmp.path(), ".cache/layouts/theme/base.njk"),
            "<html>base</html>"
        );
        assert_eq!(
            read_to_string(tmp.path(), ".cache/layouts/theme/post.njk"),
            "<article>base post</article>"
        );
    }

    #[test]
    fn user_layout_wins_but_theme_copy_keeps_base_content() {
        let (tmp, paths) = base_only_site();
        write_file(tmp.path(), "src/_user/layouts/post.njk", "<article>mine</article>");

        let report = merge_layers(&paths).unwrap();
        assert_eq!(report.layout_overrides, vec!["post.njk"]);

        // Override isolation: user content at the root, base content in theme/
        assert_eq!(
            read_to_string(tmp.path(), ".cache/layouts/post.njk"),
            "<article>mine</article>"
        );
        assert_eq!(
            read_to_string(tmp.path(), ".cache/layouts/theme/post.njk"),
            "<article>base post</article>"
        );
    }

    #[test]
    fn user_include_overrides_recursively() {
        let (tmp, paths) = base_only_site();
        write_file(tmp.path(), "src/_user/includes/partials/nav.njk", "<nav>mine</nav>");

        let report = merge_layers(&paths).unwrap();
        assert_eq!(report.include_overrides, vec!["partials/nav.njk"]);

        assert_eq!(
            read_to_string(tmp.path(), ".cache/includes/partials/nav.njk"),
            "<nav>mine</nav>"
        );
        // Untouched base file still present
        assert_eq!(
            read_to_string(tmp.path(), ".cache/includes/header.njk"),
            "<header>base</header>"
        );
    }

    #[test]
    fn merge_is_idempotent() {
        let (tmp, paths) = base_only_site();
        write_file(tmp.path(), "src/_user/layouts/post.njk", "<article>mine</article>");

        merge_layers(&paths).unwrap();
        let first: Vec<(String, String)> = snapshot(tmp.path());

        merge_layers(&paths).unwrap();
        let second: Vec<(String, String)> = snapshot(tmp.path());

        assert_eq!(first, second);
    }

    fn snapshot(root: &Path) -> Vec<(String, String)> {
        let mut files = Vec::new();
        collect(&root.join(".cache"), &mut files);
        files.sort();
        files
    }

    fn collect(dir: &Path, out: &mut Vec<(String, String)>) {
        for entry in fs::read_dir(dir).unwrap().filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_dir() {
                collect(&path, out);
            } else {
                out.push((
                    path.to_string_lossy().to_string(),
                    fs::read_to_string(&path).unwrap(),
                ));
            }
        }
    }

    #[test]
    fn dotfiles_never_reach_the_cache() {
        let (tmp, paths) = base_only_site();
        write_file(tmp.path(), "src/_user/layouts/.gitkeep", "");
        write_file(tmp.path(), "src/_user/includes/.gitkeep", "");
        write_file(tmp.path(), "src/_includes/.hidden/secret.njk", "x");

        merge_layers(&paths).unwrap();

        assert!(!tmp.path().join(".cache/layouts/.gitkeep").exists());
        assert!(!tmp.path().join(".cache/includes/.gitkeep").exists());
        assert!(!tmp.path().join(".cache/includes/.hidden").exists());
    }

    #[test]
    fn layout_subdirectories_are_not_walked() {
        // Layouts merge direct files only; includes merge recursively.
        // The asymmetry is part of the contract.
        let (tmp, paths) = base_only_site();
        write_file(tmp.path(), "src/_layouts/drafts/wip.njk", "wip");
        write_file(tmp.path(), "src/_user/layouts/drafts/mine.njk", "mine");

        merge_layers(&paths).unwrap();

        assert!(!tmp.path().join(".cache/layouts/drafts").exists());
    }

    #[test]
    fn missing_layers_are_no_ops() {
        let tmp = TempDir::new().unwrap();
        let paths = layer_paths(tmp.path());

        // No source directories at all: cache roots still created, empty report
        let report = merge_layers(&paths).unwrap();
        assert_eq!(report.layouts_seeded, 0);
        assert_eq!(report.includes_seeded, 0);
        assert!(tmp.path().join(".cache/layouts").is_dir());
        assert!(tmp.path().join(".cache/includes").is_dir());
    }

    #[test]
    fn user_only_layer_merges_without_base() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "src/_user/layouts/base.njk", "<html>mine</html>");
        let paths = layer_paths(tmp.path());

        let report = merge_layers(&paths).unwrap();
        assert_eq!(report.layout_overrides, vec!["base.njk"]);
        assert_eq!(
            read_to_string(tmp.path(), ".cache/layouts/base.njk"),
            "<html>mine</html>"
        );
        // No base layouts, so no theme/ reference namespace either
        assert!(!tmp.path().join(".cache/layouts/theme").exists());
    }

    #[test]
    fn stale_cache_files_are_not_deleted() {
        // The merge overwrites and adds, never removes.
        let (tmp, paths) = base_only_site();
        write_file(tmp.path(), ".cache/layouts/orphan.njk", "left over");

        merge_layers(&paths).unwrap();
        assert_eq!(
            read_to_string(tmp.path(), ".cache/layouts/orphan.njk"),
            "left over"
        );
    }

    #[test]
    fn visible_entries_sorted_and_filtered() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "b.txt", "b");
        write_file(tmp.path(), "a.txt", "a");
        write_file(tmp.path(), ".gitkeep", "");

        let entries = visible_entries(tmp.path()).unwrap();
        let names: Vec<String> = entries
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }
}
