//! Template shortcodes.
//!
//! The one shipped shortcode is `carousel`: a self-contained image carousel
//! fragment driven by declarative client-side attributes. Markup is generated
//! with [maud](https://maud.lambda.xyz/) — type-safe, auto-escaped, and
//! emitted without internal whitespace, so the fragment stays on a single
//! line and markdown processing cannot split it.
//!
//! ## Input Shapes
//!
//! A carousel is specified one of two ways, modeled as [`CarouselSpec`]:
//!
//! - **By reference**: `{{ carousel("hero") }}` looks up `carousels.hero`
//!   in the page's front matter.
//! - **Inline**: `{{ carousel({images: ["/img/a.jpg"]}) }}`.
//!
//! A second argument overrides display options either way:
//! `{{ carousel("hero", {autoplay: true, interval: 4000}) }}`.
//!
//! ## Client Contract
//!
//! Slides carry `data-show` expressions over a `currentSlide` signal declared
//! on the wrapper via `data-signals`; arrows and dots mutate the signal with
//! `data-on-click` expressions. The wrapper id is `carousel-` plus a short
//! pseudo-random suffix — collisions across a page are possible but accepted,
//! there is no global uniqueness registry. Autoplay is advertised through
//! `data-autoplay` / `data-autoplay-interval` attributes for the client
//! script to pick up.

use crate::filters::apply_path_prefix;
use crate::types::{CarouselDef, CarouselImage};
use maud::{Markup, html};
use minijinja::value::{Rest, Value};
use minijinja::{Error, ErrorKind, State};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Rendered in place of a carousel that resolved zero images.
pub const EMPTY_CAROUSEL_PLACEHOLDER: &str = "<!-- Carousel: No images provided -->";

/// How a template names the carousel to render.
#[derive(Debug, Clone)]
pub enum CarouselSpec {
    /// A key into the page's front-matter `carousels` map.
    ByReference(String),
    /// A full inline definition.
    Inline(CarouselDef),
}

impl CarouselSpec {
    /// Classify a template argument. Strings are references, maps are inline
    /// definitions; anything else is rejected at this boundary.
    pub fn from_template_arg(arg: &Value) -> Result<CarouselSpec, Error> {
        if let Some(key) = arg.as_str() {
            return Ok(CarouselSpec::ByReference(key.to_string()));
        }
        if arg.kind() == minijinja::value::ValueKind::Map {
            return Ok(CarouselSpec::Inline(from_value(arg)?));
        }
        Err(Error::new(
            ErrorKind::InvalidOperation,
            "carousel expects a front-matter key or an inline {images: [...]} definition",
        ))
    }
}

/// Display-option overrides passed as the shortcode's second argument.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CarouselOverrides {
    autoplay: Option<bool>,
    interval: Option<u64>,
    show_dots: Option<bool>,
    show_arrows: Option<bool>,
    height: Option<String>,
    aspect_ratio: Option<String>,
}

impl CarouselOverrides {
    fn apply(self, def: &mut CarouselDef) {
        if let Some(v) = self.autoplay {
            def.autoplay = v;
        }
        if let Some(v) = self.interval {
            def.interval = v;
        }
        if let Some(v) = self.show_dots {
            def.show_dots = v;
        }
        if let Some(v) = self.show_arrows {
            def.show_arrows = v;
        }
        if let Some(v) = self.height {
            def.height = v;
        }
        if self.aspect_ratio.is_some() {
            def.aspect_ratio = self.aspect_ratio;
        }
    }
}

/// The `carousel` shortcode entry point, wired into the engine by the
/// registry. Resolves the spec against the render context and emits the
/// fragment as a safe (pre-escaped) string.
pub fn carousel(state: &State, args: Rest<Value>, path_prefix: &str) -> Result<Value, Error> {
    let Some(first) = args.0.first() else {
        return Ok(Value::from_safe_string(EMPTY_CAROUSEL_PLACEHOLDER.to_string()));
    };

    let mut def = match CarouselSpec::from_template_arg(first)? {
        CarouselSpec::Inline(def) => def,
        CarouselSpec::ByReference(key) => lookup_page_carousel(state, &key)?.unwrap_or_default(),
    };

    if let Some(options) = args.0.get(1) {
        let overrides: CarouselOverrides = from_value(options)?;
        overrides.apply(&mut def);
    }

    let id = generate_carousel_id();
    Ok(Value::from_safe_string(render_carousel(
        &def,
        path_prefix,
        &id,
    )))
}

/// Resolve a named carousel from the page's front matter. An unknown key
/// resolves to nothing, which renders as the placeholder comment.
fn lookup_page_carousel(state: &State, key: &str) -> Result<Option<CarouselDef>, Error> {
    let Some(carousels) = state.lookup("carousels") else {
        return Ok(None);
    };
    let entry = carousels.get_attr(key).unwrap_or(Value::UNDEFINED);
    if entry.is_undefined() || entry.is_none() {
        return Ok(None);
    }
    Ok(Some(from_value(&entry)?))
}

/// Render the carousel fragment. Deterministic given the id, which tests
/// exploit; production ids come from [`generate_carousel_id`].
pub fn render_carousel(def: &CarouselDef, path_prefix: &str, carousel_id: &str) -> String {
    if def.images.is_empty() {
        return EMPTY_CAROUSEL_PLACEHOLDER.to_string();
    }

    let total = def.images.len();
    let signals = format!("{{currentSlide: 0, totalSlides: {total}}}");
    let height = (def.height != "auto").then(|| format!("height: {}", def.height));

    let markup = html! {
        div.carousel id=(carousel_id) data-signals=(signals)
            data-autoplay[def.autoplay]
            data-autoplay-interval=[def.autoplay.then_some(def.interval)]
            data-aspect-ratio=[def.aspect_ratio.as_deref()]
            role="region" aria-label="Image carousel" aria-roledescription="carousel" tabindex="0" {
            div.carousel-inner style=[height.as_deref()] {
                @for (index, img) in def.images.iter().enumerate() {
                    (slide(img, index, total, path_prefix))
                }
            }
            @if def.show_arrows {
                button.carousel-control.carousel-control-prev
                    data-on-click="$currentSlide = ($currentSlide - 1 + $totalSlides) % $totalSlides"
                    aria-label="Previous slide" {
                    span.carousel-control-icon aria-hidden="true" { "‹" }
                }
                button.carousel-control.carousel-control-next
                    data-on-click="$currentSlide = ($currentSlide + 1) % $totalSlides"
                    aria-label="Next slide" {
                    span.carousel-control-icon aria-hidden="true" { "›" }
                }
            }
            @if def.show_dots {
                div.carousel-indicators role="tablist" {
                    @for index in 0..total {
                        button.carousel-indicator
                            data-class=(format!("{{active: $currentSlide === {index}}}"))
                            data-on-click=(format!("$currentSlide = {index}"))
                            role="tab" aria-label=(format!("Go to slide {}", index + 1)) {}
                    }
                }
            }
        }
    };

    markup.into_string()
}

fn slide(img: &CarouselImage, index: usize, total: usize, path_prefix: &str) -> Markup {
    let src = apply_path_prefix(&img.src, path_prefix);
    let image = html! {
        img src=(src) alt=(img.alt) loading="lazy" title=[img.title.as_deref()];
    };

    html! {
        div.carousel-slide data-show=(format!("$currentSlide === {index}"))
            // First slide stays visible to avoid a flash of empty content
            style=[(index > 0).then_some("display: none")]
            role="group" aria-roledescription="slide"
            aria-label=(format!("Slide {} of {}", index + 1, total)) {
            @if let Some(link) = &img.link {
                a href=(apply_path_prefix(link, path_prefix)) target=[img.link_target.as_deref()] {
                    (image)
                }
            } @else {
                (image)
            }
            @if img.title.is_some() || img.caption.is_some() {
                div.carousel-caption {
                    @if let Some(title) = &img.title {
                        h3.carousel-title { (title) }
                    }
                    @if let Some(caption) = &img.caption {
                        p.carousel-caption-text { (caption) }
                    }
                }
            }
        }
    }
}

/// `carousel-` plus nine pseudo-random alphanumerics. Collisions are
/// possible and accepted.
pub fn generate_carousel_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect();
    format!("carousel-{}", suffix.to_lowercase())
}

/// Deserialize a template value through its serde representation.
fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T, Error> {
    let json = serde_json::to_value(value)
        .map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()))?;
    serde_json::from_value(json)
        .map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(src: &str) -> CarouselImage {
        CarouselImage {
            src: src.to_string(),
            alt: String::new(),
            title: None,
            caption: None,
            link: None,
            link_target: None,
        }
    }

    fn def_with(images: Vec<CarouselImage>) -> CarouselDef {
        CarouselDef {
            images,
            ..CarouselDef::default()
        }
    }

    #[test]
    fn empty_carousel_renders_placeholder_only() {
        let html = render_carousel(&def_with(vec![]), "/", "carousel-test12345");
        assert_eq!(html, EMPTY_CAROUSEL_PLACEHOLDER);
        assert!(!html.contains("<div class=\"carousel\""));
    }

    #[test]
    fn carousel_markup_structure() {
        let def = def_with(vec![image("/img/a.jpg"), image("/img/b.jpg")]);
        let html = render_carousel(&def, "/", "carousel-test12345");

        assert!(html.starts_with("<div class=\"carousel\" id=\"carousel-test12345\""));
        assert!(html.contains("data-signals=\"{currentSlide: 0, totalSlides: 2}\""));
        assert!(html.contains("data-show=\"$currentSlide === 0\""));
        assert!(html.contains("data-show=\"$currentSlide === 1\""));
        // Defaults: arrows and dots present, no autoplay
        assert!(html.contains("carousel-control-prev"));
        assert!(html.contains("carousel-indicators"));
        assert!(!html.contains("data-autoplay"));
    }

    #[test]
    fn fragment_is_single_line() {
        let mut img = image("/img/a.jpg");
        img.title = Some("Dawn".to_string());
        img.caption = Some("First light".to_string());
        let html = render_carousel(&def_with(vec![img]), "/", "carousel-x");

        assert!(!html.contains('\n'));
    }

    #[test]
    fn only_first_slide_initially_visible() {
        let def = def_with(vec![image("/a.jpg"), image("/b.jpg")]);
        let html = render_carousel(&def, "/", "carousel-x");

        // One hidden slide, and the hidden one is not the first
        assert_eq!(html.matches("style=\"display: none\"").count(), 1);
        let first = html.find("$currentSlide === 0").unwrap();
        let hidden = html.find("display: none").unwrap();
        assert!(first < hidden);
    }

    #[test]
    fn image_urls_pass_through_path_prefix() {
        let mut img = image("/img/a.jpg");
        img.link = Some("/posts/dawn/".to_string());
        let html = render_carousel(&def_with(vec![img]), "/blog/", "carousel-x");

        assert!(html.contains("src=\"/blog/img/a.jpg\""));
        assert!(html.contains("href=\"/blog/posts/dawn/\""));
    }

    #[test]
    fn external_image_urls_untouched() {
        let def = def_with(vec![image("https://cdn.example.com/a.jpg")]);
        let html = render_carousel(&def, "/blog/", "carousel-x");

        assert!(html.contains("src=\"https://cdn.example.com/a.jpg\""));
    }

    #[test]
    fn autoplay_advertised_when_enabled() {
        let mut def = def_with(vec![image("/a.jpg")]);
        def.autoplay = true;
        def.interval = 4000;
        let html = render_carousel(&def, "/", "carousel-x");

        assert!(html.contains("data-autoplay"));
        assert!(html.contains("data-autoplay-interval=\"4000\""));
    }

    #[test]
    fn arrows_and_dots_can_be_disabled() {
        let mut def = def_with(vec![image("/a.jpg")]);
        def.show_arrows = false;
        def.show_dots = false;
        let html = render_carousel(&def, "/", "carousel-x");

        assert!(!html.contains("carousel-control"));
        assert!(!html.contains("carousel-indicators"));
    }

    #[test]
    fn explicit_height_set_on_inner_container() {
        let mut def = def_with(vec![image("/a.jpg")]);
        def.height = "24rem".to_string();
        let html = render_carousel(&def, "/", "carousel-x");

        assert!(html.contains("style=\"height: 24rem\""));
    }

    #[test]
    fn caption_block_only_when_text_present() {
        let plain = render_carousel(&def_with(vec![image("/a.jpg")]), "/", "carousel-x");
        assert!(!plain.contains("carousel-caption"));

        let mut img = image("/a.jpg");
        img.title = Some("Dawn".to_string());
        let titled = render_carousel(&def_with(vec![img]), "/", "carousel-x");
        assert!(titled.contains("<h3 class=\"carousel-title\">Dawn</h3>"));
    }

    #[test]
    fn spec_from_string_is_a_reference() {
        let spec = CarouselSpec::from_template_arg(&Value::from("hero")).unwrap();
        assert!(matches!(spec, CarouselSpec::ByReference(k) if k == "hero"));
    }

    #[test]
    fn spec_from_map_is_inline() {
        let arg = Value::from_serialize(serde_json::json!({
            "images": ["/img/a.jpg"],
            "autoplay": true,
        }));
        let spec = CarouselSpec::from_template_arg(&arg).unwrap();
        match spec {
            CarouselSpec::Inline(def) => {
                assert_eq!(def.images.len(), 1);
                assert!(def.autoplay);
                assert_eq!(def.interval, 5000);
            }
            CarouselSpec::ByReference(_) => panic!("expected inline spec"),
        }
    }

    #[test]
    fn spec_from_number_rejected() {
        assert!(CarouselSpec::from_template_arg(&Value::from(7)).is_err());
    }

    #[test]
    fn generated_ids_have_the_expected_shape() {
        let id = generate_carousel_id();
        assert!(id.starts_with("carousel-"));
        assert_eq!(id.len(), "carousel-".len() + 9);
    }
}
