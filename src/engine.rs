//! Template engine binding.
//!
//! Builds the minijinja [`Environment`] used for every render in a build.
//! The loader resolves template names against exactly two directories — the
//! merged includes cache, then the merged layouts cache — so `{% include %}`
//! and `{% extends %}` find templates uniformly regardless of which layer a
//! file came from. User overrides sit at the cache roots; pristine base
//! layouts remain reachable as `theme/<name>`.
//!
//! Undefined template variables resolve to empty rather than failing the
//! render (chainable lenient mode): page metadata is author-supplied and
//! often partial, and a missing field should degrade to absent output, not
//! abort the build. Auto-escaping is off — template inputs are the site's
//! own rendered markdown and trusted front matter.

use crate::overlay::LayerPaths;
use crate::registry::Registry;
use minijinja::{AutoEscape, Environment, UndefinedBehavior, path_loader};

/// Build the environment for one build's renders: two-directory search path,
/// lenient undefined handling, no auto-escaping, and every registry entry
/// installed.
pub fn build_environment(paths: &LayerPaths, registry: &Registry) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Chainable);
    env.set_auto_escape_callback(|_name| AutoEscape::None);

    let includes = path_loader(paths.cache_includes.clone());
    let layouts = path_loader(paths.cache_layouts.clone());
    env.set_loader(move |name| {
        Ok(match includes(name)? {
            Some(source) => Some(source),
            None => layouts(name)?,
        })
    });

    registry.install(&mut env);
    env
}
