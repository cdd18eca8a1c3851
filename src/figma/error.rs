//! Export error types.
//!
//! The `Display` text of every variant is the message shown to the operator.

use std::{fmt, path::PathBuf};
use thiserror::Error;

/// The remote call an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Building the HTTP client
    Client,
    /// `GET /images/{file}`
    RenderImages,
    /// `GET /files/{file}/nodes`
    FileNodes,
    /// `GET /files/{file}/images`
    ImageFills,
    /// Fetching a rendered or raw image
    Download,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Client => "HTTP client",
            Self::RenderImages => "Figma API",
            Self::FileNodes => "File nodes API",
            Self::ImageFills => "Image fills API",
            Self::Download => "Download",
        })
    }
}

/// Data a successful response was expected to contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    HeroNode,
    HeroDocument,
    BackgroundLayer,
    ImageFill,
    RenderUrl(String),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeroNode => f.write_str("Hero banner node not found."),
            Self::HeroDocument => f.write_str("Hero banner document not found."),
            Self::BackgroundLayer => f.write_str(
                "Could not find background layer under HERO BANNER. Check node structure in Figma.",
            ),
            Self::ImageFill => f.write_str(
                "No image fill found in hero banner. Use --hero-background-only for rendered layer.",
            ),
            Self::RenderUrl(node) => {
                write!(f, "No image URL for node {node}. Node may not be renderable.")
            }
        }
    }
}

/// Figma export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No Figma token. Set {env}, use --token=..., or add it to .env")]
    MissingToken { env: String },

    #[error("{stage} error: {status} {reason}")]
    Http {
        stage: Stage,
        status: u16,
        reason: String,
    },

    #[error("{stage} request failed: {message}")]
    Transport { stage: Stage, message: String },

    #[error("{stage} returned an unreadable response: {message}")]
    Decode { stage: Stage, message: String },

    #[error("{0}")]
    NotFound(Missing),

    #[error("refusing to write `{0}` outside the image directory")]
    UnsafeOutput(String),

    #[error("IO error when writing `{0}`")]
    Io(PathBuf, #[source] std::io::Error),
}

impl ExportError {
    /// Build a transport error, keeping the HTTP status when reqwest saw one.
    pub fn transport(stage: Stage, err: &reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Http {
                stage,
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_owned(),
            },
            None => Self::Transport {
                stage,
                message: err.to_string(),
            },
        }
    }

    /// Extra guidance printed after the error, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Http { status: 403, .. } => {
                Some("Check that your token is valid and has file read scope.")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display_and_hint() {
        let err = ExportError::Http {
            stage: Stage::RenderImages,
            status: 403,
            reason: "Forbidden".into(),
        };
        assert_eq!(err.to_string(), "Figma API error: 403 Forbidden");
        assert!(err.hint().unwrap().contains("file read scope"));

        let err = ExportError::Http {
            stage: Stage::ImageFills,
            status: 404,
            reason: "Not Found".into(),
        };
        assert_eq!(err.to_string(), "Image fills API error: 404 Not Found");
        assert!(err.hint().is_none());
    }

    #[test]
    fn test_missing_messages() {
        let err = ExportError::NotFound(Missing::BackgroundLayer);
        assert!(err.to_string().contains("Could not find background layer"));

        let err = ExportError::NotFound(Missing::RenderUrl("1:1".into()));
        assert!(err.to_string().contains("Node may not be renderable"));
        assert!(err.to_string().contains("1:1"));

        let err = ExportError::NotFound(Missing::ImageFill);
        assert!(err.to_string().contains("--hero-background-only"));
    }

    #[test]
    fn test_missing_token_names_env_var() {
        let err = ExportError::MissingToken {
            env: "FIGMA_ACCESS_TOKEN".into(),
        };
        assert_eq!(
            err.to_string(),
            "No Figma token. Set FIGMA_ACCESS_TOKEN, use --token=..., or add it to .env"
        );
    }
}
