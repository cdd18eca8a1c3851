//! Site initialization.
//!
//! Prepares a checkout for the other commands: the static image directory,
//! the seeded content store, a default `yoga.toml` and ignore entries for
//! local-only files. Existing files are never overwritten, so `init` can be
//! re-run safely.

use crate::{config::SiteConfig, log, store::SiteStore};
use anyhow::{Context, Result};
use std::fs;

/// Files to write ignore patterns to
const IGNORE_FILES: &[&str] = &[".gitignore"];

/// Local-only paths: the token file, the content store, uploaded media
const IGNORED_PATHS: &[&str] = &[".env", "data/", "media/"];

/// Initialize the site rooted at `config.root`.
pub fn init_site(config: &SiteConfig) -> Result<()> {
    let images_dir = config.images_dir();
    fs::create_dir_all(&images_dir)
        .with_context(|| format!("Failed to create {}", images_dir.display()))?;

    let mut store = SiteStore::open(&config.paths.store)?;
    let created = store.seed()?;
    if created.is_empty() {
        log!("init"; "content records already present");
    } else {
        log!("init"; "created {}", created.join(", "));
    }

    if init_default_config(config)? {
        log!("init"; "wrote {}", config.config_path.display());
    }
    init_ignored_files(config)?;

    Ok(())
}

/// Write the default configuration file unless one exists.
fn init_default_config(config: &SiteConfig) -> Result<bool> {
    if config.config_path.exists() {
        return Ok(false);
    }
    let content = toml::to_string_pretty(&SiteConfig::default())?;
    fs::write(&config.config_path, content)
        .with_context(|| format!("Failed to write {}", config.config_path.display()))?;
    Ok(true)
}

/// Write ignore files that do not exist yet.
fn init_ignored_files(config: &SiteConfig) -> Result<()> {
    let mut content = IGNORED_PATHS.join("\n");
    content.push('\n');

    for filename in IGNORE_FILES {
        let path = config.root.join(filename);
        if !path.exists() {
            fs::write(&path, &content)?;
        }
    }

    Ok(())
}
