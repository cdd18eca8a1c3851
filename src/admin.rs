//! Admin list display for the singleton records.
//!
//! Renders image previews and shortened text for the `/admin` page and for
//! `yoga admin show`, and applies `yoga admin set` edits to the store.

use crate::{
    cli::{AdminAction, RecordKind},
    config::SiteConfig,
    log,
    store::{HomePage, ImageRef, SINGLETON_KEY, SiteSettings, SiteStore, Singleton, StoreError},
    template,
};
use anyhow::Result;
use quick_xml::escape::escape;

/// Admin listing HTML template (embedded at compile time)
const ADMIN_TEMPLATE: &str = include_str!("embed/admin.html");

/// Placeholder shown in place of a missing image.
const NO_IMAGE: &str = "-";

const TAGLINE_PREVIEW_CHARS: usize = 50;
const OVERLAY_TITLE_PREVIEW_CHARS: usize = 30;

// ============================================================================
// Previews
// ============================================================================

/// Bounding box of an image preview, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewSize {
    pub max_height: u32,
    pub max_width: u32,
    /// Crop to fill the box instead of letterboxing.
    pub cover: bool,
}

impl PreviewSize {
    const fn new(max_height: u32, max_width: u32) -> Self {
        Self {
            max_height,
            max_width,
            cover: false,
        }
    }

    const fn cover(mut self) -> Self {
        self.cover = true;
        self
    }
}

pub const LOGO_PREVIEW: PreviewSize = PreviewSize::new(60, 120);
pub const LOGO_TEXT_PREVIEW: PreviewSize = PreviewSize::new(40, 200);
pub const HERO_IMAGE_PREVIEW: PreviewSize = PreviewSize::new(80, 160).cover();
pub const OVERLAY_IMAGE_PREVIEW: PreviewSize = PreviewSize::new(60, 120);

/// `<img>` preview of an uploaded image, or `-` when there is none.
pub fn image_preview(image: Option<&ImageRef>, size: PreviewSize) -> String {
    let Some(image) = image else {
        return NO_IMAGE.to_owned();
    };
    let fit = if size.cover { " object-fit: cover;" } else { "" };
    format!(
        r#"<img src="{}" style="max-height: {}px; max-width: {}px;{fit}" />"#,
        escape(image.url()),
        size.max_height,
        size.max_width,
    )
}

/// First `limit` characters of `text`, with `…` appended only when cut.
pub fn truncate_preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_owned(),
    }
}

pub fn header_tagline_short(settings: &SiteSettings) -> String {
    truncate_preview(&settings.header_tagline, TAGLINE_PREVIEW_CHARS)
}

pub fn hero_overlay_title_short(home: &HomePage) -> String {
    truncate_preview(&home.hero_overlay_title, OVERLAY_TITLE_PREVIEW_CHARS)
}

// ============================================================================
// List Display
// ============================================================================

/// Columns of the site settings listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSettingsRow {
    pub id: &'static str,
    pub logo_preview: String,
    pub header_tagline_short: String,
}

impl SiteSettingsRow {
    pub fn new(settings: &SiteSettings) -> Self {
        Self {
            id: SINGLETON_KEY,
            logo_preview: image_preview(settings.logo.as_ref(), LOGO_PREVIEW),
            header_tagline_short: header_tagline_short(settings),
        }
    }

    fn to_html(&self) -> String {
        format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            self.id,
            self.logo_preview,
            escape(self.header_tagline_short.as_str())
        )
    }
}

/// Columns of the home page listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomePageRow {
    pub id: &'static str,
    pub hero_image_preview: String,
    pub hero_overlay_title_short: String,
    pub hero_cta_text: String,
}

impl HomePageRow {
    pub fn new(home: &HomePage) -> Self {
        Self {
            id: SINGLETON_KEY,
            hero_image_preview: image_preview(home.hero_image.as_ref(), HERO_IMAGE_PREVIEW),
            hero_overlay_title_short: hero_overlay_title_short(home),
            hero_cta_text: home.hero_cta_text.clone(),
        }
    }

    fn to_html(&self) -> String {
        format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            self.id,
            self.hero_image_preview,
            escape(self.hero_overlay_title_short.as_str()),
            escape(self.hero_cta_text.as_str())
        )
    }
}

// ============================================================================
// Detail Previews
// ============================================================================

/// A read-only preview shown on a record's detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewField {
    pub name: &'static str,
    pub label: &'static str,
    pub html: String,
}

impl PreviewField {
    fn new(name: &'static str, label: &'static str, html: String) -> Self {
        Self { name, label, html }
    }
}

pub fn site_settings_previews(settings: &SiteSettings) -> [PreviewField; 2] {
    [
        PreviewField::new(
            "logo_preview",
            "לוגו",
            image_preview(settings.logo.as_ref(), LOGO_PREVIEW),
        ),
        PreviewField::new(
            "logo_text_preview",
            "תמונת טקסט לוגו",
            image_preview(settings.logo_text.as_ref(), LOGO_TEXT_PREVIEW),
        ),
    ]
}

pub fn home_page_previews(home: &HomePage) -> [PreviewField; 2] {
    [
        PreviewField::new(
            "hero_image_preview",
            "תמונת באנר",
            image_preview(home.hero_image.as_ref(), HERO_IMAGE_PREVIEW),
        ),
        PreviewField::new(
            "hero_overlay_image_preview",
            "תמונת פרח",
            image_preview(home.hero_overlay_image.as_ref(), OVERLAY_IMAGE_PREVIEW),
        ),
    ]
}

fn detail_html(fields: &[PreviewField]) -> String {
    let items: String = fields
        .iter()
        .map(|field| format!("<dt>{}</dt><dd>{}</dd>", field.label, field.html))
        .collect();
    format!(r#"<dl class="detail">{items}</dl>"#)
}

/// Render the `/admin` page.
pub fn render_admin(settings: &SiteSettings, home: &HomePage) -> String {
    let site_rows = SiteSettingsRow::new(settings).to_html();
    let site_detail = detail_html(&site_settings_previews(settings));
    let home_rows = HomePageRow::new(home).to_html();
    let home_detail = detail_html(&home_page_previews(home));

    template::fill(
        ADMIN_TEMPLATE,
        &[
            ("site_title", SiteSettings::VERBOSE_NAME),
            ("site_rows", site_rows.as_str()),
            ("site_detail", site_detail.as_str()),
            ("home_title", HomePage::VERBOSE_NAME),
            ("home_rows", home_rows.as_str()),
            ("home_detail", home_detail.as_str()),
            ("version", env!("CARGO_PKG_VERSION")),
        ],
    )
}

/// Load both records and render the `/admin` page.
pub fn render_admin_page(store: &mut SiteStore) -> Result<String, StoreError> {
    let settings = store.get_or_create::<SiteSettings>()?;
    let home = store.get_or_create::<HomePage>()?;
    Ok(render_admin(&settings, &home))
}

// ============================================================================
// Command Entry Point
// ============================================================================

/// Run `yoga admin <action>`.
pub fn run(config: &SiteConfig, action: &AdminAction) -> Result<()> {
    let mut store = SiteStore::open(&config.paths.store)?;

    match action {
        AdminAction::Show => {
            let settings = store.get_or_create::<SiteSettings>()?;
            let home = store.get_or_create::<HomePage>()?;
            for line in show_lines(&settings, &home) {
                log!("admin"; "{line}");
            }
        }
        AdminAction::Set {
            record,
            field,
            value,
        } => {
            let name = set_field(&mut store, *record, field, value)?;
            log!("saved"; "{name}.{field}");
        }
    }

    Ok(())
}

/// Apply a single field edit; returns the verbose name of the edited record.
pub fn set_field(
    store: &mut SiteStore,
    record: RecordKind,
    field: &str,
    value: &str,
) -> Result<&'static str, StoreError> {
    match record {
        RecordKind::Site => {
            store.update::<SiteSettings, _>(|s| s.set_field(field, value))?;
            Ok(SiteSettings::VERBOSE_NAME)
        }
        RecordKind::Home => {
            store.update::<HomePage, _>(|h| h.set_field(field, value))?;
            Ok(HomePage::VERBOSE_NAME)
        }
    }
}

/// Terminal rendering of the list display followed by the detail previews.
fn show_lines(settings: &SiteSettings, home: &HomePage) -> Vec<String> {
    let site = SiteSettingsRow::new(settings);
    let page = HomePageRow::new(home);

    let mut lines = vec![
        SiteSettings::VERBOSE_NAME.to_owned(),
        format!("id: {}", site.id),
        format!("header_tagline_short: {}", site.header_tagline_short),
    ];
    lines.extend(
        site_settings_previews(settings)
            .iter()
            .map(|field| format!("{}: {}", field.name, field.html)),
    );

    lines.extend([
        HomePage::VERBOSE_NAME.to_owned(),
        format!("id: {}", page.id),
        format!("hero_overlay_title_short: {}", page.hero_overlay_title_short),
        format!("hero_cta_text: {}", page.hero_cta_text),
    ]);
    lines.extend(
        home_page_previews(home)
            .iter()
            .map(|field| format!("{}: {}", field.name, field.html)),
    );
    lines
}
