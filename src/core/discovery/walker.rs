//! Depth-first discovery of exportable nodes

use crate::adapters::figma::Node;
use crate::domain::ExportableNode;

/// Separator placed between ancestor names in [`ExportableNode::path`]
pub const PATH_SEPARATOR: &str = " / ";

/// Flatten a node tree into its exportable nodes
///
/// A node is exportable when its kind is frame-like or component-like and it
/// has a bounding box; exportable kinds without one are skipped silently.
/// Results are in depth-first pre-order: a node comes before its
/// descendants, and siblings keep their document order. Children of
/// exportable nodes are visited too, so nested frames are reported.
///
/// `ancestor_path` holds the names above `node`; pass an empty slice when
/// starting from the document root. The input is assumed to be a tree.
///
/// # Example
///
/// ```
/// use design_export::adapters::figma::Node;
/// use design_export::core::discovery::find_frames;
///
/// let root: Node = serde_json::from_value(serde_json::json!({
///     "id": "0:0", "name": "Document", "type": "DOCUMENT",
///     "children": [{
///         "id": "1:2", "name": "Hero", "type": "FRAME",
///         "absoluteBoundingBox": {"x": 0, "y": 0, "width": 1440, "height": 800}
///     }]
/// })).unwrap();
///
/// let frames = find_frames(&root, &[]);
/// assert_eq!(frames[0].path, "Document / Hero");
/// ```
pub fn find_frames(node: &Node, ancestor_path: &[String]) -> Vec<ExportableNode> {
    let mut path: Vec<&str> = ancestor_path.iter().map(String::as_str).collect();
    let mut found = Vec::new();
    let mut steps = vec![Step::Enter(node)];

    while let Some(step) = steps.pop() {
        let node = match step {
            Step::Enter(node) => node,
            Step::Leave => {
                path.pop();
                continue;
            }
        };

        path.push(&node.name);

        if node.kind.is_exportable() {
            if let Some(bbox) = node.bounding_box {
                found.push(ExportableNode::new(
                    node.id.clone(),
                    node.name.clone(),
                    path.join(PATH_SEPARATOR),
                    bbox,
                ));
            }
        }

        // Children pop in document order, all before this node's Leave
        steps.push(Step::Leave);
        steps.extend(node.children.iter().rev().map(Step::Enter));
    }

    found
}

/// Explicit stack entry; the walk never recurses
enum Step<'a> {
    Enter(&'a Node),
    Leave,
}
