//! `[figma]` section configuration.
//!
//! Identifies the design file, the frames to export and where the access
//! token may be found.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A Figma node and the file name it is exported to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeOutput {
    /// Composite node id, e.g. `49:133`
    pub id: String,
    /// File name inside the static image directory
    pub output: String,
}

/// `[figma]` section in yoga.toml.
///
/// # Example
/// ```toml
/// [figma]
/// file_key = "I8MWlb1THJeTQb81HP9y6R"
/// hero_banner_node = "49:136"
///
/// [[figma.nodes]]
/// id = "49:133"
/// output = "header.png"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct FigmaConfig {
    /// REST API base URL, without trailing slash.
    #[serde(default = "defaults::figma::api_base")]
    #[educe(Default = defaults::figma::api_base())]
    pub api_base: String,

    /// Key of the design file (the id in the file's share URL).
    #[serde(default = "defaults::figma::file_key")]
    #[educe(Default = defaults::figma::file_key())]
    pub file_key: String,

    /// Frame holding the hero banner, used by the hero-only export modes.
    #[serde(default = "defaults::figma::hero_banner_node")]
    #[educe(Default = defaults::figma::hero_banner_node())]
    pub hero_banner_node: String,

    /// Environment variable consulted for the access token.
    #[serde(default = "defaults::figma::token_env")]
    #[educe(Default = defaults::figma::token_env())]
    pub token_env: String,

    /// Dotenv-style file scanned for `<token_env>=...`, relative to root.
    #[serde(default = "defaults::figma::env_file")]
    #[educe(Default = defaults::figma::env_file())]
    pub env_file: PathBuf,

    /// Nodes exported by the bulk mode, in request order.
    #[serde(default = "defaults::figma::nodes")]
    #[educe(Default = defaults::figma::nodes())]
    pub nodes: Vec<NodeOutput>,
}

impl FigmaConfig {
    /// File name a node is saved under.
    ///
    /// Unmapped ids fall back to the id with `:` replaced by `-`, plus `.png`.
    pub fn output_name(&self, node_id: &str) -> String {
        self.nodes
            .iter()
            .find(|node| node.id == node_id)
            .map(|node| node.output.clone())
            .unwrap_or_else(|| format!("{}.png", node_id.replace(':', "-")))
    }

    /// Node ids requested by the bulk mode.
    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|node| node.id.as_str()).collect()
    }
}
