//! Design API models
//!
//! Request and response structures for the REST endpoints the exporter
//! consumes. These are kept separate from the domain models: a [`Node`] is
//! the provider's recursive document tree, an
//! [`ExportableNode`](crate::domain::ExportableNode) is what the exporter
//! hands to its callers.

use crate::domain::{BoundingBox, DesignApiError, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Response of `GET /files/{key}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDocument {
    /// File title
    #[serde(default)]
    pub name: String,

    /// Last modification timestamp as reported by the provider
    #[serde(default)]
    pub last_modified: Option<String>,

    /// Provider-side version identifier
    #[serde(default)]
    pub version: Option<String>,

    /// Root of the node tree
    pub document: Node,
}

impl FileDocument {
    /// Structural checks the serde layer can't express
    ///
    /// The root must be a document node and every bounding box must have
    /// finite coordinates and non-negative size.
    pub fn validate(&self) -> Result<(), DesignApiError> {
        if self.document.kind != NodeKind::Document {
            return Err(DesignApiError::MalformedDocument(format!(
                "root node {} has type {}, expected DOCUMENT",
                self.document.id, self.document.kind
            )));
        }
        validate_node(&self.document)
    }
}

fn validate_node(root: &Node) -> Result<(), DesignApiError> {
    let mut pending = vec![root];

    while let Some(node) = pending.pop() {
        if let Some(bbox) = &node.bounding_box {
            let finite = [bbox.x, bbox.y, bbox.width, bbox.height]
                .iter()
                .all(|v| v.is_finite());
            if !finite || bbox.width < 0.0 || bbox.height < 0.0 {
                return Err(DesignApiError::MalformedDocument(format!(
                    "node {} has an invalid bounding box: {bbox:?}",
                    node.id
                )));
            }
        }
        pending.extend(node.children.iter().rev());
    }

    Ok(())
}

/// One node of the provider's document tree
#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    pub id: NodeId,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "type")]
    pub kind: NodeKind,

    /// Absent or `null` for nodes without a concrete position
    #[serde(rename = "absoluteBoundingBox", default)]
    pub bounding_box: Option<BoundingBox>,

    #[serde(default)]
    pub children: Vec<Node>,
}

// Trees can be nested arbitrarily deep; the derived drop would recurse once per level
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut child) = pending.pop() {
            pending.append(&mut child.children);
        }
    }
}

/// Node type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Document,
    Canvas,
    Frame,
    Group,
    Section,
    Component,
    ComponentSet,
    Instance,
    Vector,
    Text,
    Rectangle,
    Ellipse,
    #[serde(other)]
    Unknown,
}

impl NodeKind {
    /// Frame-like and component-like kinds that can be rendered on their own
    pub fn is_exportable(self) -> bool {
        matches!(
            self,
            NodeKind::Frame | NodeKind::Component | NodeKind::ComponentSet
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            NodeKind::Document => "DOCUMENT",
            NodeKind::Canvas => "CANVAS",
            NodeKind::Frame => "FRAME",
            NodeKind::Group => "GROUP",
            NodeKind::Section => "SECTION",
            NodeKind::Component => "COMPONENT",
            NodeKind::ComponentSet => "COMPONENT_SET",
            NodeKind::Instance => "INSTANCE",
            NodeKind::Vector => "VECTOR",
            NodeKind::Text => "TEXT",
            NodeKind::Rectangle => "RECTANGLE",
            NodeKind::Ellipse => "ELLIPSE",
            NodeKind::Unknown => "UNKNOWN",
        };
        f.write_str(tag)
    }
}

/// Response of `GET /images/{key}`
///
/// Ids that failed to render are either missing from `images` or mapped
/// to `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImagesResponse {
    #[serde(default)]
    pub err: Option<String>,

    #[serde(default)]
    pub images: HashMap<String, Option<String>>,
}

impl ImagesResponse {
    /// Render URL for `id`, if the provider produced one
    pub fn url_for(&self, id: &NodeId) -> Option<&str> {
        self.images
            .get(id.as_str())
            .and_then(|url| url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

/// Rendered image format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpg,
    Svg,
    Pdf,
}

impl ImageFormat {
    /// Query parameter value and file extension
    pub fn as_str(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Svg => "svg",
            ImageFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpg),
            "svg" => Ok(ImageFormat::Svg),
            "pdf" => Ok(ImageFormat::Pdf),
            _ => Err(format!(
                "Invalid image format '{s}'. Must be one of: png, jpg, svg, pdf"
            )),
        }
    }
}

/// Rendering options for the image export call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageExportOptions {
    pub format: ImageFormat,
    /// Between 0.01 and 4 per the provider's documentation
    pub scale: f64,
}

impl Default for ImageExportOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
            scale: 1.0,
        }
    }
}
