//! Tree layout: flatten a nested tree snapshot into positioned nodes and edges
//!
//! Nodes are visited depth-first in pre-order (root, left, right). The root sits at
//! `(0, 0)`; a child at depth `d` is placed `horizontal / 2^d` to the left or right
//! of its parent and `d * vertical` down, so sibling spacing halves per level.
//!
//! Node identity is the stringified value. When a snapshot contains duplicate
//! values, only the first pre-order occurrence becomes a node; the later
//! occurrence still contributes its parent edge (if that edge id is new) and its
//! children are still walked from its computed position.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::TreeNode;

pub const DEFAULT_HORIZONTAL_SPACING: f64 = 220.0;
pub const DEFAULT_VERTICAL_SPACING: f64 = 160.0;

/// Base spacing between a parent and its children.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpacing {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Default for LayoutSpacing {
    fn default() -> Self {
        Self {
            horizontal: DEFAULT_HORIZONTAL_SPACING,
            vertical: DEFAULT_VERTICAL_SPACING,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Positioned diagram node, keyed by the tree value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayNode {
    pub id: String,
    pub label: String,
    pub position: Position,
}

/// Parent-child link between two display nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// Extents of a layout in diagram coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeLayout {
    pub nodes: Vec<DisplayNode>,
    pub edges: Vec<DisplayEdge>,
}

impl TreeLayout {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&DisplayNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.nodes.first()?;
        let init = Bounds {
            min_x: first.position.x,
            max_x: first.position.x,
            min_y: first.position.y,
            max_y: first.position.y,
        };
        Some(self.nodes.iter().fold(init, |b, n| Bounds {
            min_x: b.min_x.min(n.position.x),
            max_x: b.max_x.max(n.position.x),
            min_y: b.min_y.min(n.position.y),
            max_y: b.max_y.max(n.position.y),
        }))
    }
}

/// Convert a tree snapshot into display nodes and edges.
///
/// Returns empty collections for an empty tree.
pub fn layout_tree(root: Option<&TreeNode>, spacing: LayoutSpacing) -> TreeLayout {
    let mut builder = LayoutBuilder {
        spacing,
        layout: TreeLayout::default(),
        node_ids: HashSet::new(),
        edge_ids: HashSet::new(),
    };
    if let Some(root) = root {
        builder.visit(root, 0, 0.0, None, None);
    }
    trace!(
        "layout_tree: {} nodes, {} edges",
        builder.layout.nodes.len(),
        builder.layout.edges.len()
    );
    builder.layout
}

enum Side {
    Left,
    Right,
}

struct LayoutBuilder {
    spacing: LayoutSpacing,
    layout: TreeLayout,
    node_ids: HashSet<String>,
    edge_ids: HashSet<String>,
}

impl LayoutBuilder {
    fn visit(
        &mut self,
        node: &TreeNode,
        depth: u32,
        parent_x: f64,
        parent_id: Option<&str>,
        side: Option<Side>,
    ) {
        let offset = self.spacing.horizontal / 2f64.powi(depth as i32);
        let x = match side {
            None => 0.0,
            Some(Side::Left) => parent_x - offset,
            Some(Side::Right) => parent_x + offset,
        };
        let y = f64::from(depth) * self.spacing.vertical;
        let id = node.value.to_string();

        if self.node_ids.insert(id.clone()) {
            self.layout.nodes.push(DisplayNode {
                id: id.clone(),
                label: id.clone(),
                position: Position { x, y },
            });
        } else {
            trace!("layout_tree: duplicate node id {} skipped", id);
        }

        if let Some(parent) = parent_id {
            let edge_id = format!("e-{}-{}", parent, id);
            if self.edge_ids.insert(edge_id.clone()) {
                self.layout.edges.push(DisplayEdge {
                    id: edge_id,
                    source: parent.to_string(),
                    target: id.clone(),
                });
            }
        }

        if let Some(left) = &node.left {
            self.visit(left, depth + 1, x, Some(&id), Some(Side::Left));
        }
        if let Some(right) = &node.right {
            self.visit(right, depth + 1, x, Some(&id), Some(Side::Right));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_layout_when_computing_bounds_then_spans_all_nodes() {
        let tree = TreeNode::leaf(5)
            .with_left(TreeNode::leaf(3))
            .with_right(TreeNode::leaf(8));
        let layout = layout_tree(Some(&tree), LayoutSpacing::default());

        let bounds = layout.bounds().unwrap();
        assert_eq!(bounds.min_x, -110.0);
        assert_eq!(bounds.max_x, 110.0);
        assert_eq!(bounds.min_y, 0.0);
        assert_eq!(bounds.max_y, 160.0);
    }

    #[test]
    fn given_empty_layout_when_computing_bounds_then_none() {
        assert!(TreeLayout::default().bounds().is_none());
    }

    #[test]
    fn given_custom_spacing_when_laying_out_then_offsets_scale() {
        let tree = TreeNode::leaf(1).with_right(TreeNode::leaf(2).with_left(TreeNode::leaf(3)));
        let layout = layout_tree(
            Some(&tree),
            LayoutSpacing {
                horizontal: 100.0,
                vertical: 10.0,
            },
        );

        // depth 1: 100/2 = 50 right; depth 2: 100/4 = 25 left of 50
        assert_eq!(layout.node("2").unwrap().position, Position { x: 50.0, y: 10.0 });
        assert_eq!(layout.node("3").unwrap().position, Position { x: 25.0, y: 20.0 });
    }
}
