//! `[paths]` section configuration.
//!
//! Locations of the static tree, uploaded media and the content store.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[paths]` section in yoga.toml.
///
/// All paths are relative to the project root, except `images` which is
/// relative to `static_dir` and doubles as the URL prefix of exported images.
///
/// # Example
/// ```toml
/// [paths]
/// static_dir = "yoga/static"
/// images = "yoga/images"
/// media = "media"
/// store = "data/site.json"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Root of files served under `/static/`.
    #[serde(default = "defaults::paths::static_dir")]
    #[educe(Default = defaults::paths::static_dir())]
    pub static_dir: PathBuf,

    /// Exported image directory, inside `static_dir`.
    #[serde(default = "defaults::paths::images")]
    #[educe(Default = defaults::paths::images())]
    pub images: PathBuf,

    /// Root of uploaded media served under `/media/`.
    #[serde(default = "defaults::paths::media")]
    #[educe(Default = defaults::paths::media())]
    pub media: PathBuf,

    /// JSON file holding the singleton content records.
    #[serde(default = "defaults::paths::store")]
    #[educe(Default = defaults::paths::store())]
    pub store: PathBuf,
}
