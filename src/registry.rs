//! Per-build filter and shortcode registry.
//!
//! A [`Registry`] is a plain value constructed once per build and installed
//! into the template environment by [`crate::engine::build_environment`].
//! Nothing is registered process-wide: two builds in one process cannot see
//! each other's extensions, and a registry dropped at the end of a build
//! takes its registrations with it.
//!
//! [`Registry::with_defaults`] carries the built-in set (date formatting,
//! slugging, excerpting, URL prefixing, collection lookups, the carousel
//! shortcode). Site-specific binaries extend it before the build:
//!
//! ```no_run
//! use layerpress::registry::Registry;
//! use minijinja::value::{Rest, Value};
//!
//! let mut registry = Registry::with_defaults("/");
//! registry.add_filter("shout", |value: Value, _args: Rest<Value>| {
//!     Ok(Value::from(value.to_string().to_uppercase()))
//! });
//! ```

use crate::{filters, shortcodes};
use minijinja::value::{Rest, Value};
use minijinja::{Environment, Error, State};
use std::sync::Arc;

type FilterFn = Arc<dyn Fn(Value, Rest<Value>) -> Result<Value, Error> + Send + Sync>;
type ShortcodeFn = Arc<dyn Fn(&State, Rest<Value>) -> Result<Value, Error> + Send + Sync>;

/// Named filters and shortcodes for one build.
pub struct Registry {
    filters: Vec<(String, FilterFn)>,
    shortcodes: Vec<(String, ShortcodeFn)>,
}

impl Registry {
    /// An empty registry with no registrations at all.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            shortcodes: Vec::new(),
        }
    }

    /// The built-in filter and shortcode set. `path_prefix` is captured by
    /// the `url` filter and the carousel shortcode.
    pub fn with_defaults(path_prefix: &str) -> Self {
        let mut registry = Self::new();

        registry.add_filter("date", |value: Value, args: Rest<Value>| {
            let input = string_arg(&value);
            let format = args.0.first().and_then(|v| v.as_str().map(str::to_string));
            Ok(Value::from(filters::date_filter(&input, format.as_deref())))
        });

        registry.add_filter("dateDisplay", |value: Value, _args: Rest<Value>| {
            Ok(Value::from(filters::display_date(&string_arg(&value))))
        });

        registry.add_filter("excerpt", |value: Value, args: Rest<Value>| {
            let length = args
                .0
                .first()
                .and_then(|v| usize::try_from(v.clone()).ok())
                .unwrap_or(150);
            Ok(Value::from(filters::excerpt(&string_arg(&value), length)))
        });

        registry.add_filter("slug", |value: Value, _args: Rest<Value>| {
            Ok(Value::from(filters::slugify(&string_arg(&value))))
        });

        registry.add_filter("find", |value: Value, args: Rest<Value>| {
            let key = args.0.first().and_then(|v| v.as_str()).unwrap_or_default();
            let target = args.0.get(1).cloned().unwrap_or(Value::UNDEFINED);
            Ok(filters::find_in_list(&value, key, &target))
        });

        registry.add_filter("limit", |value: Value, args: Rest<Value>| {
            let n = args
                .0
                .first()
                .and_then(|v| usize::try_from(v.clone()).ok())
                .unwrap_or(usize::MAX);
            Ok(Value::from(filters::limit_list(&value, n)))
        });

        registry.add_filter("getPostsByCollection", |value: Value, args: Rest<Value>| {
            let name = args.0.first().and_then(|v| v.as_str()).unwrap_or_default();
            Ok(Value::from(filters::get_posts_by_collection(&value, name)))
        });

        registry.add_filter("getUniqueCollections", |value: Value, _args: Rest<Value>| {
            Ok(Value::from(filters::get_unique_collections(&value)))
        });

        registry.add_filter("getRelatedPosts", |value: Value, args: Rest<Value>| {
            let collections = args.0.first().cloned().unwrap_or(Value::UNDEFINED);
            let tags = args.0.get(1).cloned().unwrap_or(Value::UNDEFINED);
            let limit = args
                .0
                .get(2)
                .and_then(|v| usize::try_from(v.clone()).ok())
                .unwrap_or(3);
            Ok(Value::from(filters::get_related_posts(
                &value,
                &collections,
                &tags,
                limit,
            )))
        });

        let prefix = path_prefix.to_string();
        registry.add_filter("url", move |value: Value, _args: Rest<Value>| {
            Ok(Value::from(filters::apply_path_prefix(
                &string_arg(&value),
                &prefix,
            )))
        });

        let prefix = path_prefix.to_string();
        registry.add_shortcode("carousel", move |state: &State, args: Rest<Value>| {
            shortcodes::carousel(state, args, &prefix)
        });

        registry
    }

    /// Register a filter. Later registrations with the same name win, so a
    /// site can replace a built-in.
    pub fn add_filter<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(Value, Rest<Value>) -> Result<Value, Error> + Send + Sync + 'static,
    {
        self.filters.push((name.into(), Arc::new(f)));
    }

    /// Register a shortcode, callable from templates as a function.
    pub fn add_shortcode<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&State, Rest<Value>) -> Result<Value, Error> + Send + Sync + 'static,
    {
        self.shortcodes.push((name.into(), Arc::new(f)));
    }

    /// Install every registration into a template environment.
    pub fn install(&self, env: &mut Environment<'_>) {
        for (name, f) in &self.filters {
            let f = Arc::clone(f);
            env.add_filter(name.clone(), move |value: Value, args: Rest<Value>| {
                (*f)(value, args)
            });
        }
        for (name, f) in &self.shortcodes {
            let f = Arc::clone(f);
            env.add_function(name.clone(), move |state: &State, args: Rest<Value>| {
                (*f)(state, args)
            });
        }
    }

    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn shortcode_names(&self) -> Vec<&str> {
        self.shortcodes.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn string_arg(value: &Value) -> String {
    value
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}
