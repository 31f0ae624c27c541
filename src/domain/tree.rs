//! Read-only traversal primitives and invariant helpers for the command forest.

use std::collections::HashSet;

use tracing::instrument;

use crate::domain::{CommandId, CommandNode};

/// Depth-first, pre-order search across the forest.
pub fn find_by_id<'a>(forest: &'a [CommandNode], id: &CommandId) -> Option<&'a CommandNode> {
    for node in forest {
        if &node.id == id {
            return Some(node);
        }
        if let Some(found) = find_by_id(node.children(), id) {
            return Some(found);
        }
    }
    None
}

pub fn find_by_id_mut<'a>(
    forest: &'a mut [CommandNode],
    id: &CommandId,
) -> Option<&'a mut CommandNode> {
    for node in forest.iter_mut() {
        if &node.id == id {
            return Some(node);
        }
        if let Some(children) = node.children.as_deref_mut() {
            if let Some(found) = find_by_id_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// The sibling list (root list or some node's children) directly holding `id`.
///
/// Every branch is searched; only an actual match short-circuits.
pub fn sibling_list_containing<'a>(
    forest: &'a [CommandNode],
    id: &CommandId,
) -> Option<&'a [CommandNode]> {
    if forest.iter().any(|node| &node.id == id) {
        return Some(forest);
    }
    forest
        .iter()
        .find_map(|node| sibling_list_containing(node.children(), id))
}

/// Labels from the root down to the node with `id` (inclusive).
pub fn path_to(forest: &[CommandNode], id: &CommandId) -> Option<Vec<String>> {
    for node in forest {
        if &node.id == id {
            return Some(vec![node.label.clone()]);
        }
        if let Some(mut rest) = path_to(node.children(), id) {
            rest.insert(0, node.label.clone());
            return Some(rest);
        }
    }
    None
}

/// New forest where the node with `id` carries `new_label`.
///
/// Unknown ids leave the forest unchanged.
#[instrument(level = "debug", skip(forest))]
pub fn rename_by_id(forest: Vec<CommandNode>, id: &CommandId, new_label: &str) -> Vec<CommandNode> {
    forest
        .into_iter()
        .map(|mut node| {
            if &node.id == id {
                node.label = new_label.to_string();
            } else if let Some(children) = node.children.take() {
                node.children = Some(rename_by_id(children, id, new_label));
            }
            node
        })
        .collect()
}

/// Collapse every empty children list to `None`.
pub fn normalize(forest: Vec<CommandNode>) -> Vec<CommandNode> {
    forest
        .into_iter()
        .map(|mut node| {
            node.children = node
                .children
                .take()
                .map(normalize)
                .filter(|children| !children.is_empty());
            node
        })
        .collect()
}

/// True if some node holds `Some(vec![])` as its children.
pub fn has_empty_children(forest: &[CommandNode]) -> bool {
    forest.iter().any(|node| match &node.children {
        Some(children) => children.is_empty() || has_empty_children(children),
        None => false,
    })
}

/// Pre-order iterator over every node of the forest.
pub struct PreOrder<'a> {
    stack: Vec<&'a CommandNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a CommandNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reverse so the leftmost child comes out first
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

pub fn iter(forest: &[CommandNode]) -> PreOrder<'_> {
    PreOrder {
        stack: forest.iter().rev().collect(),
    }
}

pub fn all_ids(forest: &[CommandNode]) -> Vec<CommandId> {
    iter(forest).map(|node| node.id.clone()).collect()
}

/// Ids that occur more than once, each reported once in pre-order.
pub fn duplicate_ids(forest: &[CommandNode]) -> Vec<CommandId> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for node in iter(forest) {
        if !seen.insert(&node.id) && reported.insert(&node.id) {
            duplicates.push(node.id.clone());
        }
    }
    duplicates
}

pub fn count(forest: &[CommandNode]) -> usize {
    iter(forest).count()
}

/// Number of nesting levels; an empty forest has depth 0.
pub fn depth(forest: &[CommandNode]) -> usize {
    forest
        .iter()
        .map(|node| 1 + depth(node.children()))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CommandNode;

    fn fixture() -> Vec<CommandNode> {
        vec![
            CommandNode::group("a", "A").with_children(vec![
                CommandNode::command("b", "B", "/b"),
                CommandNode::group("c", "C")
                    .with_children(vec![CommandNode::command("d", "D", "/d")]),
            ]),
            CommandNode::group("e", "E").with_children(vec![CommandNode::command("f", "F", "/f")]),
        ]
    }

    #[test]
    fn given_nested_forest_when_iter_then_visits_in_preorder() {
        let ids: Vec<String> = iter(&fixture()).map(|n| n.id.to_string()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn given_nested_forest_when_depth_then_counts_levels() {
        assert_eq!(depth(&fixture()), 3);
        assert_eq!(depth(&[]), 0);
    }

    #[test]
    fn given_deep_node_when_path_to_then_returns_labels_from_root() {
        let path = path_to(&fixture(), &"d".into()).unwrap();
        assert_eq!(path, vec!["A", "C", "D"]);
    }

    #[test]
    fn given_nested_empty_children_when_normalize_then_collapses_all() {
        let mut inner = CommandNode::group("c", "C");
        inner.children = Some(vec![]);
        let mut outer = CommandNode::group("a", "A");
        outer.children = Some(vec![inner]);

        let normalized = normalize(vec![outer]);

        assert!(!has_empty_children(&normalized));
        assert!(normalized[0].children()[0].children.is_none());
    }

    #[test]
    fn given_repeated_id_when_duplicate_ids_then_reports_once() {
        let forest = vec![
            CommandNode::command("x", "X", "/x"),
            CommandNode::group("g", "G").with_children(vec![
                CommandNode::command("x", "X2", "/x"),
                CommandNode::command("x", "X3", "/x"),
            ]),
        ];
        assert_eq!(duplicate_ids(&forest), vec![CommandId::from("x")]);
    }
}
