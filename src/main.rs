//! Yoga - content backend and Figma asset exporter for the yoga site.

mod admin;
mod cli;
mod config;
mod figma;
mod init;
mod logger;
mod serve;
mod store;
mod template;
mod view;

use anyhow::{Result, bail};
use clap::Parser;
use cli::{Cli, Commands, ExportArgs};
use config::SiteConfig;
use init::init_site;
use serve::serve_site;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Init => init_site(&config),
        Commands::Export { export_args } => export(&config, export_args),
        Commands::Serve { .. } => serve_site(&config),
        Commands::Admin { action } => admin::run(&config, action),
    }
}

/// Run the export and print its report.
///
/// Failures are reported but only change the exit status with `--strict`.
fn export(config: &SiteConfig, args: &ExportArgs) -> Result<()> {
    let report = figma::export_images(config, args);
    figma::report::print(&report);

    if args.strict && !report.is_success() {
        bail!("export finished with errors");
    }
    Ok(())
}
