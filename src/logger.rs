//! Logging utilities with colored output.
//!
//! Provides the `log!` macro for formatted terminal output with colored
//! prefixes. Every operator-facing message of the crate goes through here.
//! `error` lines go to stderr, everything else to stdout. Messages are
//! written whole; exporter diagnostics carry URLs and causes that must not
//! be cut off.
//!
//! # Example
//!
//! ```ignore
//! log!("export"; "saved {}", path.display());
//! log!("error"; "download failed {name}: {err}");
//! ```

use colored::{ColoredString, Colorize};
use std::io::{Write, stderr, stdout};

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Output stream a line is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Stdout,
    Stderr,
}

impl Target {
    fn for_module(module_lower: &str) -> Self {
        if module_lower == "error" {
            Self::Stderr
        } else {
            Self::Stdout
        }
    }
}

/// Log a message with a colored module prefix.
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    match Target::for_module(&module_lower) {
        Target::Stdout => write_line(&mut stdout().lock(), &prefix, message),
        Target::Stderr => write_line(&mut stderr().lock(), &prefix, message),
    }
}

fn write_line(out: &mut impl Write, prefix: &ColoredString, message: &str) {
    writeln!(out, "{prefix} {message}").ok();
    out.flush().ok();
}

/// Apply color to a module prefix based on module type.
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module_lower {
        "serve" => prefix.bright_blue().bold(),
        "admin" => prefix.bright_cyan().bold(),
        "saved" => prefix.bright_green().bold(),
        "warn" | "note" => prefix.bright_magenta().bold(),
        "error" => prefix.bright_red().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}
