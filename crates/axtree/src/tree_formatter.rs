//! Tree formatting utilities for element trees
//!
//! Produces an indented one-line-per-node listing for terminals and logs,
//! plus an index of the nodes that have geometry so callers can point at
//! them by number.

use crate::element::Element;
use crate::geometry::BBox;
use std::collections::HashMap;

/// Result of tree formatting: the text and the bounds mapping
#[derive(Debug, Clone)]
pub struct TreeFormattingResult {
    /// The formatted listing, one node per line
    pub formatted: String,
    /// Mapping of index to (role, name, bbox)
    /// Key is 1-based in pre-order, only nodes with a bbox are indexed
    pub index_to_bounds: HashMap<u32, (String, String, BBox)>,
    /// Total count of indexed elements
    pub element_count: u32,
}

/// Label shown after the geometry: the first present of name, description,
/// value and role description. Newlines are flattened.
fn node_label(node: &Element) -> Option<String> {
    let label = node
        .name
        .clone()
        .or_else(|| node.description.clone())
        .or_else(|| node.value.as_ref().map(|v| v.to_string()))
        .or_else(|| node.role_description.clone())?;
    Some(label.replace('\n', " "))
}

fn format_line(node: &Element, level: usize) -> String {
    let mut line = "  ".repeat(level);
    line.push(' ');
    line.push_str(&node.role);
    if let (Some(p), Some(s)) = (node.position, node.size) {
        line.push_str(&format!(
            " ({:.0};{:.0};{:.0};{:.0})",
            p.x, p.y, s.width, s.height
        ));
    }
    if let Some(label) = node_label(node) {
        line.push_str(&format!(" ({label})"));
    }
    line
}

/// Format a tree as an indented listing.
///
/// Output format:
///  AXWindow (0;0;800;600) (Editor)
///    AXButton (10;10;40;20) (Save)
pub fn format_tree(root: &Element) -> TreeFormattingResult {
    let mut output = String::new();
    let mut index_to_bounds = HashMap::new();
    let mut next_index = 1u32;

    let mut stack: Vec<(&Element, usize)> = vec![(root, 0)];
    while let Some((node, level)) = stack.pop() {
        output.push_str(&format_line(node, level));
        output.push('\n');

        if let Some(bbox) = node.bbox {
            index_to_bounds.insert(
                next_index,
                (
                    node.role.clone(),
                    node.name.clone().unwrap_or_default(),
                    bbox,
                ),
            );
            next_index += 1;
        }

        stack.extend(node.children.iter().rev().map(|c| (c, level + 1)));
    }

    TreeFormattingResult {
        formatted: output,
        index_to_bounds,
        element_count: next_index - 1,
    }
}

/// Format several roots back to back
pub fn format_forest(roots: &[Element]) -> String {
    roots
        .iter()
        .map(|root| format_tree(root).formatted)
        .collect::<Vec<_>>()
        .join("")
}
