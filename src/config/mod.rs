//! Site configuration management for `yoga.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[figma]`   | Design file, exported nodes, token lookup        |
//! | `[paths]`   | Static tree, media root, content store location  |
//! | `[serve]`   | Development server (interface, port)             |
//!
//! The file is optional: every field has a default matching the layout of
//! the site repository.
//!
//! # Example
//!
//! ```toml
//! [figma]
//! file_key = "I8MWlb1THJeTQb81HP9y6R"
//!
//! [paths]
//! static_dir = "yoga/static"
//!
//! [serve]
//! port = 8000
//! ```

pub mod defaults;
mod error;
mod figma;
mod paths;
mod serve;

pub use error::ConfigError;
pub use figma::{FigmaConfig, NodeOutput};

use paths::PathsConfig;
use serve::ServeConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Component, Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing yoga.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute project root (set after loading)
    #[serde(skip)]
    #[educe(Default = PathBuf::from("./"))]
    pub root: PathBuf,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Figma export settings
    #[serde(default)]
    pub figma: FigmaConfig,

    /// Filesystem layout
    #[serde(default)]
    pub paths: PathsConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load configuration for a CLI invocation.
    ///
    /// A missing config file is not an error; defaults are used instead.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.update_with_cli(cli);
        config.validate()?;

        Ok(config)
    }

    /// Directory of exported images, e.g. `<root>/yoga/static/yoga/images`.
    pub fn images_dir(&self) -> PathBuf {
        self.paths.static_dir.join(&self.paths.images)
    }

    /// URL path of a file in the images directory, relative to `/static/`.
    pub fn image_static_path(&self, file_name: &str) -> String {
        let prefix = self.paths.images.to_string_lossy().replace('\\', "/");
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            file_name.to_owned()
        } else {
            format!("{prefix}/{file_name}")
        }
    }

    /// Path of the dotenv file consulted for the Figma token.
    pub fn env_file_path(&self) -> PathBuf {
        self.root.join(&self.figma.env_file)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli.root.clone().unwrap_or_else(|| self.root.clone());
        self.update_path_with_root(&root, &cli.config);

        if let Commands::Serve { interface, port } = &cli.command {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve directory paths against root and normalize them to absolute paths.
    ///
    /// `paths.images` stays relative: it is both a directory under
    /// `static_dir` and a URL prefix.
    fn update_path_with_root(&mut self, root: &Path, config_file: &Path) {
        let root = Self::normalize_path(root);
        self.config_path = Self::normalize_path(&root.join(config_file));
        self.paths.static_dir = Self::normalize_path(&root.join(&self.paths.static_dir));
        self.paths.media = Self::normalize_path(&root.join(&self.paths.media));
        self.paths.store = Self::normalize_path(&root.join(&self.paths.store));
        self.root = root;
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let figma = &self.figma;

        if !figma.api_base.starts_with("http://") && !figma.api_base.starts_with("https://") {
            bail!(ConfigError::Validation(
                "[figma.api_base] must start with http:// or https://".into()
            ));
        }

        if figma.file_key.trim().is_empty() {
            bail!(ConfigError::Validation("[figma.file_key] must not be empty".into()));
        }

        if figma.nodes.is_empty() {
            bail!(ConfigError::Validation("[figma.nodes] must not be empty".into()));
        }

        if !figma.nodes.iter().any(|n| n.id == figma.hero_banner_node) {
            bail!(ConfigError::Validation(format!(
                "[figma.hero_banner_node] `{}` is not listed in [figma.nodes]",
                figma.hero_banner_node
            )));
        }

        if let Some(node) = figma.nodes.iter().find(|n| !is_plain_file_name(&n.output)) {
            bail!(ConfigError::Validation(format!(
                "[figma.nodes] output `{}` must be a plain file name",
                node.output
            )));
        }

        if !self
            .paths
            .images
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            bail!(ConfigError::Validation(
                "[paths.images] must be a relative path inside [paths.static_dir]".into()
            ));
        }

        Ok(())
    }
}

/// A single normal path component, no separators or `..`.
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

// ============================================================================
// Tests
// ============================================================================
