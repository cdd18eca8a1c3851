//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// [figma] Section Defaults
// ============================================================================

pub mod figma {
    use super::super::NodeOutput;
    use std::path::PathBuf;

    pub fn api_base() -> String {
        "https://api.figma.com/v1".into()
    }

    pub fn file_key() -> String {
        "I8MWlb1THJeTQb81HP9y6R".into()
    }

    pub fn hero_banner_node() -> String {
        "49:136".into()
    }

    pub fn token_env() -> String {
        "FIGMA_ACCESS_TOKEN".into()
    }

    pub fn env_file() -> PathBuf {
        ".env".into()
    }

    /// HEADER DESKTOP, LOGO and HERO BANNER frames.
    pub fn nodes() -> Vec<NodeOutput> {
        [
            ("49:133", "header.png"),
            ("49:134", "logo.png"),
            ("49:136", "hero-banner.png"),
        ]
        .into_iter()
        .map(|(id, output)| NodeOutput {
            id: id.into(),
            output: output.into(),
        })
        .collect()
    }
}

// ============================================================================
// [paths] Section Defaults
// ============================================================================

pub mod paths {
    use std::path::PathBuf;

    pub fn static_dir() -> PathBuf {
        "yoga/static".into()
    }

    pub fn images() -> PathBuf {
        "yoga/images".into()
    }

    pub fn media() -> PathBuf {
        "media".into()
    }

    pub fn store() -> PathBuf {
        "data/site.json".into()
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        8000
    }
}
