//! Shared types used across all pipeline stages.
//!
//! These types are serialized to JSON between stages (merge → scan → generate)
//! and must be identical across all three modules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A content document parsed from a markdown file (a post or a page).
///
/// The filename stem becomes the slug; front matter supplies everything else.
/// Templates see the whole document as `page`, with the front matter under
/// `page.data` and the rendered markdown body as `content`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Source path relative to the project root
    pub source_path: String,
    /// URL slug derived from the filename stem
    pub slug: String,
    /// Site-relative URL (`/posts/<slug>/` for posts, `/<slug>/` for pages)
    pub url: String,
    /// Title from front matter, or the slug with dashes as spaces
    pub title: String,
    /// Parsed front matter
    pub data: FrontMatter,
    /// Markdown body rendered to HTML
    pub content: String,
}

/// YAML front matter of a content document.
///
/// Every field is optional; a document with no front matter block at all gets
/// the default. Unknown keys are preserved in `extra` and exposed to templates
/// unchanged rather than rejected — content files are authored by hand and a
/// stray key should not fail a build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    /// Layout template name (e.g. `post.njk`); falls back to the configured
    /// default layout when absent.
    pub layout: Option<String>,
    pub tags: Vec<String>,
    /// Named collections this post belongs to. A post with none is grouped
    /// nowhere but still appears in `allPosts`.
    #[serde(rename = "postCollections", skip_serializing_if = "Vec::is_empty")]
    pub post_collections: Vec<String>,
    /// Named carousel definitions referenced by the `carousel` shortcode.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub carousels: BTreeMap<String, CarouselDef>,
    /// Any other front-matter keys, passed through to templates as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml_ng::Value>,
}

/// A carousel definition: an image list plus display options.
///
/// Lives in front matter under `carousels.<name>` or is passed inline to the
/// `carousel` shortcode. Field names are camelCase to match how content
/// authors write front matter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CarouselDef {
    pub images: Vec<CarouselImage>,
    pub autoplay: bool,
    /// Autoplay advance interval in milliseconds.
    pub interval: u64,
    pub show_dots: bool,
    pub show_arrows: bool,
    /// CSS height for the slide container; `"auto"` means no explicit height.
    pub height: String,
    pub aspect_ratio: Option<String>,
}

impl Default for CarouselDef {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            autoplay: false,
            interval: 5000,
            show_dots: true,
            show_arrows: true,
            height: "auto".to_string(),
            aspect_ratio: None,
        }
    }
}

/// One carousel image.
///
/// Front matter may give either a bare path string or a full table; bare
/// strings deserialize to an image with an empty alt text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "CarouselImageSpec", rename_all = "camelCase")]
pub struct CarouselImage {
    pub src: String,
    pub alt: String,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub link: Option<String>,
    pub link_target: Option<String>,
}

/// Accepts both authoring shapes for a carousel image.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum CarouselImageSpec {
    Path(String),
    Full {
        src: String,
        #[serde(default)]
        alt: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        caption: Option<String>,
        #[serde(default)]
        link: Option<String>,
        #[serde(default, rename = "linkTarget")]
        link_target: Option<String>,
    },
}

impl From<CarouselImageSpec> for CarouselImage {
    fn from(spec: CarouselImageSpec) -> Self {
        match spec {
            CarouselImageSpec::Path(src) => CarouselImage {
                src,
                alt: String::new(),
                title: None,
                caption: None,
                link: None,
                link_target: None,
            },
            CarouselImageSpec::Full {
                src,
                alt,
                title,
                caption,
                link,
                link_target,
            } => CarouselImage {
                src,
                alt,
                title,
                caption,
                link,
                link_target,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_matter_defaults_when_empty() {
        let fm: FrontMatter = serde_yaml_ng::from_str("{}").unwrap();
        assert!(fm.title.is_none());
        assert!(fm.tags.is_empty());
        assert!(fm.post_collections.is_empty());
        assert!(fm.carousels.is_empty());
    }

    #[test]
    fn front_matter_preserves_unknown_keys() {
        let fm: FrontMatter = serde_yaml_ng::from_str("title: Hi\nhero: /img/hero.jpg\n").unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hi"));
        assert!(fm.extra.contains_key("hero"));
    }

    #[test]
    fn post_collections_key_is_camel_case() {
        let fm: FrontMatter =
            serde_yaml_ng::from_str("postCollections:\n  - travel\n  - food\n").unwrap();
        assert_eq!(fm.post_collections, vec!["travel", "food"]);
    }

    #[test]
    fn carousel_image_from_bare_string() {
        let img: CarouselImage = serde_yaml_ng::from_str("/img/a.jpg").unwrap();
        assert_eq!(img.src, "/img/a.jpg");
        assert_eq!(img.alt, "");
        assert!(img.link.is_none());
    }

    #[test]
    fn carousel_image_from_table() {
        let img: CarouselImage =
            serde_yaml_ng::from_str("src: /img/a.jpg\nalt: Dawn\nlinkTarget: _blank\n").unwrap();
        assert_eq!(img.src, "/img/a.jpg");
        assert_eq!(img.alt, "Dawn");
        assert_eq!(img.link_target.as_deref(), Some("_blank"));
    }

    #[test]
    fn carousel_def_defaults() {
        let def: CarouselDef = serde_yaml_ng::from_str("images: []").unwrap();
        assert!(!def.autoplay);
        assert_eq!(def.interval, 5000);
        assert!(def.show_dots);
        assert!(def.show_arrows);
        assert_eq!(def.height, "auto");
        assert!(def.aspect_ratio.is_none());
    }
}
