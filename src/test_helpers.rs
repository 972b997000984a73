//! Shared test utilities for the layerpress test suite.
//!
//! Fixtures are built programmatically into a `TempDir` so every test gets
//! an isolated site it can mutate freely.

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::overlay::LayerPaths;

/// Write a file under `root`, creating parent directories as needed.
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Read a file under `root` to a string. Panics with the path on miss.
pub fn read_to_string(root: &Path, rel: &str) -> String {
    let path = root.join(rel);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

/// Layer paths for a project rooted at `root` with the default config and
/// the conventional `.cache` cache root.
pub fn layer_paths(root: &Path) -> LayerPaths {
    LayerPaths::new(root, &root.join(".cache"), &SiteConfig::default())
}

/// Build a small but complete fixture site:
///
/// - base layouts `base.njk` and `post.njk`, sharing a nav include
/// - a base include under `partials/`
/// - two posts (date-prefixed filenames, one in the `travel` collection)
/// - an `index` page and an `about` page
/// - a sparse `site.toml`
pub fn setup_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    write_file(root, "site.toml", "[site]\ntitle = \"Fixture Blog\"\n");

    write_file(
        root,
        "src/_layouts/base.njk",
        "{% include \"partials/nav.njk\" %}<main>{{ content }}</main>",
    );
    write_file(
        root,
        "src/_layouts/post.njk",
        "{% include \"partials/nav.njk\" %}<article><h1>{{ title }}</h1>{{ content }}</article>",
    );
    write_file(root, "src/_includes/partials/nav.njk", "<nav>base nav</nav>");

    write_file(
        root,
        "src/posts/2026-01-10-hello.md",
        "---\ntitle: Hello\nlayout: post.njk\npostCollections:\n  - travel\n---\nHello *world*.\n",
    );
    write_file(
        root,
        "src/posts/2026-02-20-kyoto.md",
        "---\ntitle: Kyoto in February\nlayout: post.njk\npostCollections:\n  - travel\n---\nAbout *Kyoto*.\n",
    );

    write_file(
        root,
        "src/pages/index.md",
        "---\ntitle: Home\n---\n# Welcome\n",
    );
    write_file(
        root,
        "src/pages/about.md",
        "---\ntitle: About\n---\nAbout this site.\n",
    );

    tmp
}
