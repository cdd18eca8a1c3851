//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Yoga site backend CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: yoga.toml)
    #[arg(short = 'C', long, default_value = "yoga.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Figma export arguments
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ExportArgs {
    /// Figma personal access token (or set FIGMA_ACCESS_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// Export only hero background layer (no overlay; still rendered by Figma)
    #[arg(long, conflicts_with = "hero_raw_image")]
    pub hero_background_only: bool,

    /// Download hero background as raw image file (no Figma effects/filters)
    #[arg(long)]
    pub hero_raw_image: bool,

    /// Exit with a non-zero status when any step of the export fails
    #[arg(long)]
    pub strict: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Seed the content store and create the static image directory
    Init,

    /// Export Figma nodes as PNG into the static image directory
    Export {
        #[command(flatten)]
        export_args: ExportArgs,
    },

    /// Serve the home page, the admin listing and static files
    Serve {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Inspect or edit the site content records
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

/// Admin actions over the singleton records
#[derive(Subcommand, Debug, Clone)]
pub enum AdminAction {
    /// Print the admin list display of both records
    Show,

    /// Set a single field of a record
    Set {
        /// Which record to edit
        #[arg(value_enum)]
        record: RecordKind,

        /// Field name, e.g. `header_tagline` or `hero_cta_link`
        field: String,

        /// New value (empty string clears optional image fields)
        value: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Site settings (logo, tagline)
    Site,
    /// Home page hero section
    Home,
}
