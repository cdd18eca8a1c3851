//! Response shapes of the Figma REST API.
//!
//! Only the fields the exporter reads are modelled. Every field is optional
//! because the API omits or nulls them freely; a missing field is a "not
//! found" for the caller, never a decode error. Maps keep response order.

use indexmap::IndexMap;
use serde::{Deserialize, de::IgnoredAny};
use serde_json::Value;

/// `GET /images/{file_key}?ids=...&format=png`
#[derive(Debug, Default, Deserialize)]
pub struct ImagesResponse {
    #[serde(default)]
    images: Option<IndexMap<String, Option<String>>>,

    #[serde(default)]
    pub err: Option<String>,
}

impl ImagesResponse {
    /// Node id to temporary download URL, in response order.
    ///
    /// `None` marks a node the API could not render.
    pub fn images(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.images
            .iter()
            .flatten()
            .map(|(id, url)| (id.as_str(), non_empty(url.as_deref())))
    }

    /// Download URL of a single node.
    pub fn url_for(&self, node_id: &str) -> Option<&str> {
        self.images
            .as_ref()
            .and_then(|images| images.get(node_id))
            .and_then(|url| non_empty(url.as_deref()))
    }

    /// The `err` field, when the API set one.
    pub fn error(&self) -> Option<&str> {
        non_empty(self.err.as_deref())
    }
}

/// `GET /files/{file_key}/nodes?ids=...&depth=n`
#[derive(Debug, Default, Deserialize)]
pub struct NodesResponse {
    #[serde(default)]
    nodes: Option<IndexMap<String, Option<NodeEntry>>>,
}

impl NodesResponse {
    /// Entry for a requested node id.
    pub fn entry(&self, node_id: &str) -> Option<&NodeEntry> {
        self.nodes.as_ref()?.get(node_id)?.as_ref()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NodeEntry {
    #[serde(default)]
    pub document: Option<Node>,
}

/// A node of the document graph (frame, group, rectangle, ...).
#[derive(Debug, Default, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub children: Option<Vec<Node>>,

    #[serde(default)]
    pub fills: Option<Vec<Fill>>,
}

impl Node {
    /// Direct children in document order (bottom layer first).
    pub fn children(&self) -> &[Node] {
        self.children.as_deref().unwrap_or_default()
    }

    /// First image reference in this subtree.
    ///
    /// A node's own fills are searched before its children, depth-first.
    pub fn find_image_ref(&self) -> Option<&str> {
        self.fills
            .iter()
            .flatten()
            .find_map(Fill::image_ref)
            .or_else(|| self.children().iter().find_map(Node::find_image_ref))
    }
}

/// A paint entry of a node's `fills`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Fill {
    Paint {
        #[serde(rename = "imageRef", default)]
        image_ref: Option<String>,
    },
    Other(IgnoredAny),
}

impl Fill {
    pub fn image_ref(&self) -> Option<&str> {
        match self {
            Self::Paint { image_ref } => non_empty(image_ref.as_deref()),
            Self::Other(_) => None,
        }
    }
}

/// `GET /files/{file_key}/images`
///
/// The mapping from image reference to URL is accepted under `images`, under
/// `meta.images`, or as the top-level object itself.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ImageFillsResponse {
    Wrapped { images: IndexMap<String, Value> },
    Meta { meta: ImageFillsMeta },
    Flat(IndexMap<String, Value>),
}

#[derive(Debug, Deserialize)]
pub struct ImageFillsMeta {
    images: IndexMap<String, Value>,
}

impl ImageFillsResponse {
    /// Image reference to URL, in response order. Non-string values map to `None`.
    pub fn into_map(self) -> IndexMap<String, Option<String>> {
        let images = match self {
            Self::Wrapped { images } | Self::Meta { meta: ImageFillsMeta { images } } => images,
            Self::Flat(images) => images,
        };
        images
            .into_iter()
            .map(|(key, value)| {
                let url = match value {
                    Value::String(url) if !url.is_empty() => Some(url),
                    _ => None,
                };
                (key, url)
            })
            .collect()
    }
}

/// Resolve the download URL of an image reference.
///
/// Tried in order:
/// 1. exact key match
/// 2. the first key (response order) equal to the reference, a prefix of it,
///    or prefixed by it; its value is taken even when empty
/// 3. the only entry, when the mapping has exactly one
pub fn resolve_image_url<'a>(
    images: &'a IndexMap<String, Option<String>>,
    image_ref: &str,
) -> Option<&'a str> {
    if let Some(Some(url)) = images.get(image_ref) {
        return Some(url.as_str());
    }

    let prefix_match = images.iter().find(|(key, _)| {
        !key.is_empty()
            && (key.as_str() == image_ref
                || image_ref.starts_with(key.as_str())
                || key.starts_with(image_ref))
    });
    if let Some((_, Some(url))) = prefix_match {
        return Some(url.as_str());
    }

    match images.values().next() {
        Some(Some(url)) if images.len() == 1 => Some(url.as_str()),
        _ => None,
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}
