//! Wire types for tree sessions and manual tree commands

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use termtree::Tree;

use crate::domain::DomainError;

/// Server-defined nested binary tree node.
///
/// Missing `left`/`right` keys decode as empty children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub value: i64,
    #[serde(default)]
    pub left: Option<Box<TreeNode>>,
    #[serde(default)]
    pub right: Option<Box<TreeNode>>,
}

impl TreeNode {
    pub fn leaf(value: i64) -> Self {
        Self {
            value,
            left: None,
            right: None,
        }
    }

    pub fn with_left(mut self, child: TreeNode) -> Self {
        self.left = Some(Box::new(child));
        self
    }

    pub fn with_right(mut self, child: TreeNode) -> Self {
        self.right = Some(Box::new(child));
        self
    }

    /// Number of nodes in this subtree.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        1 + self.left.as_ref().map_or(0, |n| n.len()) + self.right.as_ref().map_or(0, |n| n.len())
    }

    /// Height in levels (a single node has depth 1).
    pub fn depth(&self) -> usize {
        1 + self
            .left
            .as_ref()
            .map_or(0, |n| n.depth())
            .max(self.right.as_ref().map_or(0, |n| n.depth()))
    }

    /// Build a termtree for terminal display, labelling each child with its side.
    pub fn to_display_tree(&self) -> Tree<String> {
        self.display_tree_labelled(None)
    }

    fn display_tree_labelled(&self, side: Option<Direction>) -> Tree<String> {
        let label = match side {
            Some(Direction::Left) => format!("L: {}", self.value),
            Some(Direction::Right) => format!("R: {}", self.value),
            None => self.value.to_string(),
        };
        let mut tree = Tree::new(label);
        if let Some(left) = &self.left {
            tree.push(left.display_tree_labelled(Some(Direction::Left)));
        }
        if let Some(right) = &self.right {
            tree.push(right.display_tree_labelled(Some(Direction::Right)));
        }
        tree
    }
}

/// A named tree session as returned by `/trees`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSession {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub tree_data: Option<TreeNode>,
}

impl TreeSession {
    pub fn node_count(&self) -> usize {
        self.tree_data.as_ref().map_or(0, TreeNode::len)
    }
}

/// Side of the parent a new node is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Left,
    Right,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(DomainError::InvalidDirection(s.to_string())),
        }
    }
}

/// Traversal order computed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TraversalKind {
    Preorder,
    #[default]
    Inorder,
    Postorder,
}

impl TraversalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraversalKind::Preorder => "preorder",
            TraversalKind::Inorder => "inorder",
            TraversalKind::Postorder => "postorder",
        }
    }

    /// Capitalised name for status lines ("Preorder").
    pub fn title(&self) -> &'static str {
        match self {
            TraversalKind::Preorder => "Preorder",
            TraversalKind::Inorder => "Inorder",
            TraversalKind::Postorder => "Postorder",
        }
    }
}

impl fmt::Display for TraversalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TraversalKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preorder" => Ok(TraversalKind::Preorder),
            "inorder" => Ok(TraversalKind::Inorder),
            "postorder" => Ok(TraversalKind::Postorder),
            _ => Err(DomainError::InvalidTraversal(s.to_string())),
        }
    }
}

/// Result of `/trees/{id}/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub found: bool,
    #[serde(default)]
    pub node_id: Option<i64>,
}

/// Result of `/trees/{id}/traversal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traversal {
    #[serde(rename = "type", default)]
    pub kind: Option<TraversalKind>,
    #[serde(default)]
    pub order: Vec<i64>,
}
