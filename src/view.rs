//! Home page view.
//!
//! Composes the two content records with whatever Figma exports exist in the
//! static image directory, then renders the embedded page template.

use crate::{
    config::SiteConfig,
    store::{HomePage, SiteSettings, SiteStore, StoreError},
    template,
};
use quick_xml::escape::escape;

/// Home page HTML template (embedded at compile time)
const HOME_TEMPLATE: &str = include_str!("embed/home.html");

/// Extensions checked for an exported hero banner, in order of preference.
const HERO_BANNER_EXTENSIONS: &[&str] = &["jpg", "png", "webp"];

const LOGO_FILE: &str = "logo.png";
const HEADER_FILE: &str = "header.png";

/// Exported Figma images found on disk, as paths relative to `/static/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FigmaAssets {
    pub use_figma_logo: bool,
    pub figma_logo_file: Option<String>,
    /// Only the full header export exists; the logo must be cropped out of it.
    pub figma_logo_crop: bool,
    pub use_figma_hero: bool,
    pub figma_hero_file: Option<String>,
}

impl FigmaAssets {
    /// Check the image directory for exported files.
    pub fn detect(config: &SiteConfig) -> Self {
        let images_dir = config.images_dir();
        let has_logo_png = images_dir.join(LOGO_FILE).exists();
        let has_header_png = images_dir.join(HEADER_FILE).exists();
        let figma_hero_file = find_hero_banner(config);

        let figma_logo_file = if has_logo_png {
            Some(config.image_static_path(LOGO_FILE))
        } else if has_header_png {
            Some(config.image_static_path(HEADER_FILE))
        } else {
            None
        };

        Self {
            use_figma_logo: has_logo_png || has_header_png,
            figma_logo_file,
            figma_logo_crop: has_header_png && !has_logo_png,
            use_figma_hero: figma_hero_file.is_some(),
            figma_hero_file,
        }
    }
}

/// First `hero-banner.{jpg,png,webp}` present in the image directory.
pub fn find_hero_banner(config: &SiteConfig) -> Option<String> {
    let images_dir = config.images_dir();
    HERO_BANNER_EXTENSIONS
        .iter()
        .map(|ext| format!("hero-banner.{ext}"))
        .find(|name| images_dir.join(name).exists())
        .map(|name| config.image_static_path(&name))
}

/// Everything the home page template needs.
#[derive(Debug, Clone)]
pub struct HomeContext {
    pub site_settings: SiteSettings,
    pub homepage: HomePage,
    pub figma: FigmaAssets,
}

impl HomeContext {
    pub fn load(store: &mut SiteStore, config: &SiteConfig) -> Result<Self, StoreError> {
        Ok(Self {
            site_settings: store.get_or_create()?,
            homepage: store.get_or_create()?,
            figma: FigmaAssets::detect(config),
        })
    }
}

/// Render the home page.
///
/// Exported Figma images take precedence over uploaded ones.
pub fn render_home(ctx: &HomeContext) -> String {
    let settings = &ctx.site_settings;
    let home = &ctx.homepage;

    let figma = &ctx.figma;
    let figma_logo = figma.figma_logo_file.as_ref().filter(|_| figma.use_figma_logo);
    let figma_hero = figma.figma_hero_file.as_ref().filter(|_| figma.use_figma_hero);

    let logo = match (figma_logo, &settings.logo) {
        (Some(file), _) => {
            let class = if figma.figma_logo_crop { "logo logo--crop" } else { "logo" };
            let src = format!("/static/{}", template::url_path(file));
            format!(r#"<img class="{class}" src="{}" alt="" />"#, escape(src.as_str()))
        }
        (None, Some(logo)) => {
            format!(r#"<img class="logo" src="{}" alt="" />"#, escape(logo.url()))
        }
        (None, None) => String::new(),
    };

    let logo_text = settings
        .logo_text
        .as_ref()
        .map(|image| format!(r#"<img class="logo-text" src="{}" alt="" />"#, escape(image.url())))
        .unwrap_or_default();

    let hero_background = match (figma_hero, &home.hero_image) {
        (Some(file), _) => format!("/static/{}", template::url_path(file)),
        (None, Some(image)) => image.url(),
        (None, None) => String::new(),
    };
    let hero_style = if hero_background.is_empty() {
        String::new()
    } else {
        format!(
            r#" style="background-image: url('{}')""#,
            escape(hero_background.as_str())
        )
    };

    let overlay_image = home
        .hero_overlay_image
        .as_ref()
        .map(|image| {
            format!(r#"<img class="hero__flower" src="{}" alt="" />"#, escape(image.url()))
        })
        .unwrap_or_default();

    let header_tagline = escape(settings.header_tagline.as_str());
    let overlay_title = escape(home.hero_overlay_title.as_str());
    let overlay_text = escape(home.hero_overlay_text.as_str());
    let subtitle = escape(home.hero_subtitle.as_str());
    let cta_link = escape(home.hero_cta_link.as_str());
    let cta_text = escape(home.hero_cta_text.as_str());

    template::fill(
        HOME_TEMPLATE,
        &[
            ("logo", logo.as_str()),
            ("logo_text", logo_text.as_str()),
            ("header_tagline", &*header_tagline),
            ("hero_style", hero_style.as_str()),
            ("hero_overlay_image", overlay_image.as_str()),
            ("hero_overlay_title", &*overlay_title),
            ("hero_overlay_text", &*overlay_text),
            ("hero_subtitle", &*subtitle),
            ("hero_cta_link", &*cta_link),
            ("hero_cta_text", &*cta_text),
        ],
    )
}
