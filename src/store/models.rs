//! Singleton content records.
//!
//! `SiteSettings` holds the header (logo images and tagline), `HomePage` the
//! hero section. Both exist exactly once, under [`SINGLETON_KEY`].

use super::StoreError;
use crate::template;
use educe::Educe;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Key every singleton record is stored under.
pub const SINGLETON_KEY: &str = "1";

/// A record of which exactly one instance exists.
pub trait Singleton: Serialize + DeserializeOwned + Default {
    /// Collection name inside the store file.
    const KIND: &'static str;

    /// Human-readable record name shown in the admin listing.
    const VERBOSE_NAME: &'static str;

    /// Set a field from its textual value, as entered in the admin interface.
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), StoreError>;

    /// Check field limits.
    fn validate(&self) -> Result<(), StoreError>;
}

/// Uploaded image, stored as a path relative to the media root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Parse an admin-entered path. Blank input clears the field.
    pub fn parse(value: &str) -> Result<Option<Self>, StoreError> {
        let value = value.trim().trim_start_matches('/');
        if value.is_empty() {
            return Ok(None);
        }
        if value.split('/').any(|part| part == ".." || part.is_empty()) {
            return Err(StoreError::Validation(format!(
                "image path `{value}` must be relative to the media root"
            )));
        }
        Ok(Some(Self(value.to_owned())))
    }

    /// Path relative to the media root.
    pub fn path(&self) -> &str {
        &self.0
    }

    /// Public URL of the image, each segment percent-encoded.
    pub fn url(&self) -> String {
        format!("/media/{}", template::url_path(self.path()))
    }
}

// ============================================================================
// SiteSettings
// ============================================================================

/// Site settings: logo, logo text image, header tagline.
#[derive(Debug, Clone, PartialEq, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default)]
pub struct SiteSettings {
    pub logo: Option<ImageRef>,

    /// Logo text image (תבונת המעבר)
    pub logo_text: Option<ImageRef>,

    #[educe(Default = "מרחב לנשים באמצע החיים".to_owned())]
    pub header_tagline: String,
}

impl Singleton for SiteSettings {
    const KIND: &'static str = "site_settings";
    const VERBOSE_NAME: &'static str = "הגדרות אתר";

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), StoreError> {
        match field {
            "logo" => self.logo = ImageRef::parse(value)?,
            "logo_text" => self.logo_text = ImageRef::parse(value)?,
            "header_tagline" => self.header_tagline = value.to_owned(),
            _ => return Err(StoreError::UnknownField(Self::KIND, field.to_owned())),
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), StoreError> {
        check_max_chars("header_tagline", &self.header_tagline, 300)
    }
}

// ============================================================================
// HomePage
// ============================================================================

/// Home page hero section content.
#[derive(Debug, Clone, PartialEq, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default)]
pub struct HomePage {
    pub hero_image: Option<ImageRef>,

    #[educe(Default = "\"אם היית פרח\"".to_owned())]
    pub hero_overlay_title: String,

    #[educe(Default = "סדנה נשית חוויתית ומקצועית ומותאמת לעולם הארגוני".to_owned())]
    pub hero_overlay_text: String,

    /// Flower image
    pub hero_overlay_image: Option<ImageRef>,

    #[educe(Default = "הסדנה מיועדת לנשים בגיל 40+".to_owned())]
    pub hero_subtitle: String,

    #[educe(Default = "לתיאום סדנאות".to_owned())]
    pub hero_cta_text: String,

    /// URL or in-page anchor
    #[educe(Default = "#contact".to_owned())]
    pub hero_cta_link: String,
}

impl Singleton for HomePage {
    const KIND: &'static str = "home_page";
    const VERBOSE_NAME: &'static str = "דף בית";

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), StoreError> {
        match field {
            "hero_image" => self.hero_image = ImageRef::parse(value)?,
            "hero_overlay_title" => self.hero_overlay_title = value.to_owned(),
            "hero_overlay_text" => self.hero_overlay_text = value.to_owned(),
            "hero_overlay_image" => self.hero_overlay_image = ImageRef::parse(value)?,
            "hero_subtitle" => self.hero_subtitle = value.to_owned(),
            "hero_cta_text" => self.hero_cta_text = value.to_owned(),
            "hero_cta_link" => self.hero_cta_link = value.trim().to_owned(),
            _ => return Err(StoreError::UnknownField(Self::KIND, field.to_owned())),
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), StoreError> {
        check_max_chars("hero_overlay_title", &self.hero_overlay_title, 200)?;
        check_max_chars("hero_subtitle", &self.hero_subtitle, 300)?;
        check_max_chars("hero_cta_text", &self.hero_cta_text, 100)?;

        let link = &self.hero_cta_link;
        let valid_link = link.is_empty()
            || link.starts_with('#')
            || link.starts_with("http://")
            || link.starts_with("https://");
        if !valid_link {
            return Err(StoreError::Validation(
                "hero_cta_link must be empty, an #anchor or an http(s) URL".into(),
            ));
        }
        Ok(())
    }
}

/// Limits count characters, not bytes.
fn check_max_chars(field: &str, value: &str, max: usize) -> Result<(), StoreError> {
    let len = value.chars().count();
    if len > max {
        return Err(StoreError::Validation(format!(
            "{field} is {len} characters long, at most {max} allowed"
        )));
    }
    Ok(())
}
