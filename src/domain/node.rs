//! Exportable node domain model
//!
//! An [`ExportableNode`] is one image-exportable element discovered in a
//! design document. It moves through three states: discovered (only
//! structural fields set), exported (`image_url` populated by the batcher)
//! and cached (`local_path` populated by the image cache). A node may stop
//! at any state; callers must treat a missing `local_path` as "not
//! available" rather than as a failure of the whole export.

use super::ids::NodeId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Position and size of a node in document coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// One image-exportable element of a design file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportableNode {
    /// Identifier scoped to the remote file
    pub node_id: NodeId,

    /// Human-readable label, not guaranteed unique
    pub name: String,

    /// Ancestor chain from the document root to this node, inclusive
    pub path: String,

    /// Signed render URL; empty until exported. Expires provider-side, so
    /// it should be consumed promptly rather than persisted.
    pub image_url: String,

    /// Cached image on disk; set only after a successful download
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,

    /// Render width, taken from the bounding box at discovery time
    pub width: f64,

    /// Render height, taken from the bounding box at discovery time
    pub height: f64,

    pub bounding_box: BoundingBox,
}

impl ExportableNode {
    /// Create a freshly discovered node
    pub fn new(
        node_id: NodeId,
        name: impl Into<String>,
        path: impl Into<String>,
        bounding_box: BoundingBox,
    ) -> Self {
        Self {
            node_id,
            name: name.into(),
            path: path.into(),
            image_url: String::new(),
            local_path: None,
            width: bounding_box.width,
            height: bounding_box.height,
            bounding_box,
        }
    }

    /// Whether the batcher obtained a render URL for this node
    pub fn is_exported(&self) -> bool {
        !self.image_url.is_empty()
    }

    /// Whether the rendered image is available on disk
    pub fn is_cached(&self) -> bool {
        self.local_path.is_some()
    }
}
