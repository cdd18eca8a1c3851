//! Operator-facing rendering of an [`ExportReport`].

use super::export::{ExportEvent, ExportMode, ExportReport, SavedKind};
use crate::log;

/// Render the report as log lines, in the order things happened.
pub fn print(report: &ExportReport) {
    for line in lines(report) {
        log!(line.module; "{}", line.message);
    }
}

/// A single rendered message.
#[derive(Debug, PartialEq, Eq)]
pub struct Line {
    pub module: &'static str,
    pub message: String,
}

impl Line {
    fn new(module: &'static str, message: impl Into<String>) -> Self {
        Self {
            module,
            message: message.into(),
        }
    }
}

pub fn lines(report: &ExportReport) -> Vec<Line> {
    let mut lines: Vec<Line> = report.events.iter().map(event_line).collect();

    if let Some(error) = &report.aborted {
        lines.push(Line::new("error", error.to_string()));
        if let Some(hint) = error.hint() {
            lines.push(Line::new("error", hint));
        }
        return lines;
    }

    if report.mode == ExportMode::Bulk {
        lines.push(Line::new(
            "export",
            format!(
                "done. {} image(s) saved to {}",
                report.saved().count(),
                report.images_dir.display()
            ),
        ));
    }
    lines
}

fn event_line(event: &ExportEvent) -> Line {
    match event {
        ExportEvent::ApiWarning(err) => Line::new("warn", format!("Figma API err: {err}")),
        ExportEvent::Skipped(node) => Line::new("export", format!("skip (no URL): {node}")),
        ExportEvent::Exporting(node) => {
            Line::new("export", format!("exporting hero background node: {node}"))
        }
        ExportEvent::Saved { path, kind, .. } => {
            let suffix = match kind {
                SavedKind::Rendered => "",
                SavedKind::BackgroundOnly => " (hero background only, no overlay)",
                SavedKind::RawImage => " (raw image, no effects)",
            };
            Line::new("saved", format!("{}{suffix}", path.display()))
        }
        ExportEvent::DownloadFailed { file, error } => {
            Line::new("error", format!("download failed {file}: {error}"))
        }
        ExportEvent::FallbackToBackground => Line::new(
            "note",
            "Raw image fills not available for this file; saving rendered layer without overlay instead.",
        ),
    }
}
