//! Figma asset export.
//!
//! Pulls images from a Figma design file into the static image directory:
//!
//! | Mode | Requests | Output |
//! |------|----------|--------|
//! | bulk (default) | `/images` for every configured node | one file per node |
//! | `--hero-background-only` | `/nodes` depth 1, `/images` for the first child | `hero-banner.png` |
//! | `--hero-raw-image` | `/nodes` depth 4, `/files/../images` | `hero-banner.png` |
//!
//! The raw-image mode degrades to the background-only mode when the image
//! fill's URL cannot be resolved.

mod client;
mod error;
mod export;
pub mod report;
mod token;
mod types;

use crate::{cli::ExportArgs, config::SiteConfig};
use client::{FigmaApi, HttpClient};
use error::ExportError;
use export::{ExportMode, ExportReport, Exporter};
use token::resolve_token;

/// Run the export selected by `args` against the live API.
pub fn export_images(config: &SiteConfig, args: &ExportArgs) -> ExportReport {
    let env_value = std::env::var(&config.figma.token_env).ok();
    run_export(config, args, env_value, |token| {
        HttpClient::new(&config.figma, token)
    })
}

/// Resolve the token, connect, and run the selected mode.
///
/// Without a token nothing is created and `connect` is never called.
fn run_export<A, F>(
    config: &SiteConfig,
    args: &ExportArgs,
    env_value: Option<String>,
    connect: F,
) -> ExportReport
where
    A: FigmaApi,
    F: FnOnce(String) -> Result<A, ExportError>,
{
    let mode = ExportMode::from_args(args);
    let images_dir = config.images_dir();

    let token = resolve_token(
        args.token.as_deref(),
        env_value,
        &config.env_file_path(),
        &config.figma.token_env,
    );
    let Some(token) = token else {
        let error = ExportError::MissingToken {
            env: config.figma.token_env.clone(),
        };
        return ExportReport::not_started(mode, images_dir, error);
    };

    match connect(token) {
        Ok(api) => Exporter::new(&api, &config.figma, images_dir).run(mode),
        Err(error) => ExportReport::not_started(mode, images_dir, error),
    }
}
