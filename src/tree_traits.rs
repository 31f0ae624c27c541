/*
Rendering helpers for the command forest.

Forest is a plain Vec<CommandNode>, so display goes through a trait instead of an inherent impl.
 */
use termtree::Tree;
use tracing::instrument;

use crate::domain::{CommandNode, NodeKind};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

/// One-line label of a node; groups carry a trailing `/`.
pub fn node_label(node: &CommandNode) -> String {
    match node.kind {
        NodeKind::Group => format!("{}/ ({})", node.label, node.id),
        NodeKind::Command => format!("{} ({})", node.label, node.id),
    }
}

impl TreeNodeConvert for CommandNode {
    #[instrument(level = "trace", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        // Recursively construct the children
        let leaves: Vec<_> = self.children().iter().map(|c| c.to_tree_string()).collect();

        Tree::new(node_label(self)).with_leaves(leaves)
    }
}

// A forest renders under a synthetic root
impl TreeNodeConvert for [CommandNode] {
    fn to_tree_string(&self) -> Tree<String> {
        if self.is_empty() {
            return Tree::new("(no commands)".to_string());
        }
        Tree::new(".".to_string()).with_leaves(self.iter().map(|n| n.to_tree_string()))
    }
}
