//! Template filters: dates, excerpts, slugs, URL prefixing, and the
//! collection lookups used by post lists.
//!
//! Everything here is a pure function. The minijinja-facing registration
//! lives in [`crate::registry`]; these functions are the testable cores.
//!
//! ## Fail-Soft Policy
//!
//! Content filters degrade instead of failing the build: an unparseable date
//! renders as the raw input string, a missing collections field means an
//! empty list, a `find` over a non-list yields nothing. A blog build should
//! produce a visibly-odd page for bad metadata, not abort. The date parse is
//! still surfaced as a `Result` ([`parse_date_input`]) so callers that want
//! to report bad dates can.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime};
use minijinja::value::Value;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("unrecognized date input: {input}")]
pub struct DateParseError {
    pub input: String,
}

/// Parse a date string in any of the accepted shapes: RFC 3339, a bare
/// `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` without offset (treated as UTC), or
/// RFC 2822.
pub fn parse_date_input(input: &str) -> Result<DateTime<FixedOffset>, DateParseError> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc().fixed_offset());
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let naive = date.and_hms_opt(0, 0, 0).unwrap();
        return Ok(naive.and_utc().fixed_offset());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Ok(dt);
    }

    Err(DateParseError {
        input: input.to_string(),
    })
}

/// Render a date in one of the supported display formats. Unrecognized
/// format strings fall back to ISO 8601.
pub fn format_date(dt: &DateTime<FixedOffset>, format: Option<&str>) -> String {
    match format {
        Some("YYYY") => dt.format("%Y").to_string(),
        Some("YYYY-MM-DD") => dt.format("%Y-%m-%d").to_string(),
        Some("MMMM Do, YYYY") => dt.format("%B %-d, %Y").to_string(),
        _ => dt.to_rfc3339(),
    }
}

/// The `date` filter: `"now"` means the current time; anything else is
/// parsed. Unparseable input returns the input unchanged so a broken date
/// degrades to visible raw text instead of breaking the page.
pub fn date_filter(input: &str, format: Option<&str>) -> String {
    let dt = if input == "now" {
        Local::now().fixed_offset()
    } else {
        match parse_date_input(input) {
            Ok(dt) => dt,
            Err(_) => return input.to_string(),
        }
    };
    format_date(&dt, format)
}

/// The `dateDisplay` filter: long-form `Month D, YYYY`, same fail-soft rule.
pub fn display_date(input: &str) -> String {
    match parse_date_input(input) {
        Ok(dt) => dt.format("%B %-d, %Y").to_string(),
        Err(_) => input.to_string(),
    }
}

/// The `excerpt` filter: strip HTML tags and truncate to `length` characters,
/// appending `...` when truncated.
pub fn excerpt(html: &str, length: usize) -> String {
    let mut text = String::new();
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => text.push(c),
            _ => {}
        }
    }

    if text.chars().count() > length {
        let truncated: String = text.chars().take(length).collect();
        format!("{truncated}...")
    } else {
        text
    }
}

/// The `slug` filter: lowercase, runs of non-alphanumerics collapse to a
/// single dash, no leading or trailing dash.
pub fn slugify(input: &str) -> String {
    let mut out = String::new();
    let mut pending_dash = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

/// The `url` filter: prefix a root-relative path with the deployment path
/// prefix. External URLs (`http…`, `//…`), empty input, and the root prefix
/// pass through untouched.
///
/// Applying the filter twice with a non-root prefix double-prefixes; callers
/// apply it once per URL.
pub fn apply_path_prefix(url: &str, prefix: &str) -> String {
    if url.is_empty() || url.starts_with("http") || url.starts_with("//") || prefix == "/" {
        return url.to_string();
    }
    let clean = url.strip_prefix('/').unwrap_or(url);
    format!("{}/{}", prefix.trim_end_matches('/'), clean)
}

// ============================================================================
// Collection filters
// ============================================================================

/// The `getPostsByCollection` filter: the subset of `posts` whose
/// `data.postCollections` contains `name`, input order preserved.
pub fn get_posts_by_collection(posts: &Value, name: &str) -> Vec<Value> {
    iter_values(posts)
        .into_iter()
        .filter(|post| post_collections(post).iter().any(|c| c == name))
        .collect()
}

/// The `getUniqueCollections` filter: deduplicated collection names across
/// `posts`, in first-seen order.
pub fn get_unique_collections(posts: &Value) -> Vec<String> {
    let mut seen = Vec::new();
    for post in iter_values(posts) {
        for name in post_collections(&post) {
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
    }
    seen
}

/// The `getRelatedPosts` filter: posts sharing a collection with
/// `current_collections` — or, for posts that declare no collections, a tag
/// with `current_tags` — truncated to `limit`.
pub fn get_related_posts(
    posts: &Value,
    current_collections: &Value,
    current_tags: &Value,
    limit: usize,
) -> Vec<Value> {
    let collections = string_list(current_collections);
    let tags = string_list(current_tags);
    if collections.is_empty() && tags.is_empty() {
        return Vec::new();
    }

    iter_values(posts)
        .into_iter()
        .filter(|post| {
            if has_attr_path(post, &["data", "postCollections"]) {
                return post_collections(post)
                    .iter()
                    .any(|c| collections.contains(c));
            }
            if !tags.is_empty() {
                let post_tags = attr_path(post, &["data", "tags"])
                    .map(|v| string_list(&v))
                    .unwrap_or_default();
                return post_tags.iter().any(|t| tags.contains(t));
            }
            false
        })
        .take(limit)
        .collect()
}

/// The `find` filter: first element whose `key` attribute equals `value`.
/// Non-list input yields none.
pub fn find_in_list(list: &Value, key: &str, value: &Value) -> Value {
    iter_values(list)
        .into_iter()
        .find(|item| {
            item.get_attr(key)
                .map(|attr| attr == *value)
                .unwrap_or(false)
        })
        .unwrap_or(Value::from(()))
}

/// The `limit` filter: the first `n` elements of a list.
pub fn limit_list(list: &Value, n: usize) -> Vec<Value> {
    iter_values(list).into_iter().take(n).collect()
}

fn iter_values(value: &Value) -> Vec<Value> {
    value
        .try_iter()
        .map(|it| it.collect())
        .unwrap_or_default()
}

fn attr_path(value: &Value, path: &[&str]) -> Option<Value> {
    let mut current = value.clone();
    for key in path {
        current = current.get_attr(key).ok()?;
        if current.is_undefined() || current.is_none() {
            return None;
        }
    }
    Some(current)
}

fn has_attr_path(value: &Value, path: &[&str]) -> bool {
    attr_path(value, path).is_some()
}

fn post_collections(post: &Value) -> Vec<String> {
    attr_path(post, &["data", "postCollections"])
        .map(|v| string_list(&v))
        .unwrap_or_default()
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .try_iter()
        .map(|it| it.filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}
