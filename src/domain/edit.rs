//! Structural edits on the command forest.
//!
//! A move is two phases: the dragged node is cut out of the forest together
//! with its subtree (capture-and-remove), then the pruned forest is searched
//! for the drop target (locate-and-insert). Because the second phase never
//! sees the captured subtree, a node cannot end up below itself: dropping it
//! onto itself or onto one of its descendants simply misses the target.

use tracing::{debug, instrument};

use crate::domain::tree::find_by_id_mut;
use crate::domain::{CommandId, CommandNode, DomainError, DropIntent, DropPolicy};

/// A node cut out of the forest plus the slot it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub node: CommandNode,
    /// Owning node, `None` for the root list
    pub parent: Option<CommandId>,
    /// Position within the owning sibling list
    pub index: usize,
}

/// Remove the node with `id` (and its subtree) from wherever it lives.
///
/// Sibling lists emptied by the removal collapse to `None`.
#[instrument(level = "debug", skip(forest))]
pub fn remove_and_capture(
    forest: Vec<CommandNode>,
    id: &CommandId,
) -> (Vec<CommandNode>, Option<Captured>) {
    capture_in(forest, id, None)
}

fn capture_in(
    list: Vec<CommandNode>,
    id: &CommandId,
    parent: Option<&CommandId>,
) -> (Vec<CommandNode>, Option<Captured>) {
    let mut kept = Vec::with_capacity(list.len());
    let mut captured = None;

    for (index, mut node) in list.into_iter().enumerate() {
        if captured.is_none() {
            if &node.id == id {
                captured = Some(Captured {
                    node,
                    parent: parent.cloned(),
                    index,
                });
                continue;
            }
            if let Some(children) = node.children.take() {
                let (rest, found) = capture_in(children, id, Some(&node.id));
                node.children = if rest.is_empty() { None } else { Some(rest) };
                captured = found;
            }
        }
        kept.push(node);
    }

    (kept, captured)
}

/// Place `node` relative to `target`.
///
/// Returns the node back as `Err` when `target` is not in the forest.
#[instrument(level = "debug", skip(forest, node))]
pub fn insert_relative(
    forest: &mut Vec<CommandNode>,
    target: &CommandId,
    node: CommandNode,
    intent: DropIntent,
) -> Result<(), CommandNode> {
    if let Some(pos) = forest.iter().position(|n| &n.id == target) {
        match intent {
            DropIntent::Into => forest[pos].push_child(node),
            DropIntent::After => forest.insert(pos + 1, node),
            DropIntent::Before => forest.insert(pos, node),
        }
        return Ok(());
    }

    let mut node = node;
    for sibling in forest.iter_mut() {
        if let Some(children) = sibling.children.as_mut() {
            match insert_relative(children, target, node, intent) {
                Ok(()) => return Ok(()),
                Err(back) => node = back,
            }
        }
    }
    Err(node)
}

/// Put a captured node back into the slot it was cut from.
pub fn restore(forest: &mut Vec<CommandNode>, captured: Captured) {
    let Captured {
        node,
        parent,
        index,
    } = captured;

    if let Some(parent_id) = parent.as_ref() {
        if let Some(owner) = find_by_id_mut(forest, parent_id) {
            let children = owner.children.get_or_insert_with(Vec::new);
            children.insert(index.min(children.len()), node);
            return;
        }
    }
    forest.insert(index.min(forest.len()), node);
}

/// Result of a drag-and-drop move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderOutcome {
    Moved,
    /// Nothing matched the drag id; the forest is unchanged
    DragNotFound(CommandId),
    /// The drop target was missing after removal
    TargetNotFound {
        target: CommandId,
        node: Box<CommandNode>,
        restored: bool,
    },
}

impl ReorderOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, ReorderOutcome::Moved)
    }

    pub fn to_error(&self) -> Option<DomainError> {
        match self {
            ReorderOutcome::Moved => None,
            ReorderOutcome::DragNotFound(id) => Some(DomainError::DragNotFound(id.clone())),
            ReorderOutcome::TargetNotFound { target, .. } => {
                Some(DomainError::TargetNotFound(target.clone()))
            }
        }
    }
}

/// Move `drag_id` relative to `target_id`.
///
/// A vanished target discards the dragged node.
pub fn reorder(
    forest: Vec<CommandNode>,
    drag_id: &CommandId,
    target_id: &CommandId,
    intent: DropIntent,
) -> (Vec<CommandNode>, ReorderOutcome) {
    reorder_with_policy(forest, drag_id, target_id, intent, DropPolicy::Discard)
}

#[instrument(level = "debug", skip(forest))]
pub fn reorder_with_policy(
    forest: Vec<CommandNode>,
    drag_id: &CommandId,
    target_id: &CommandId,
    intent: DropIntent,
    policy: DropPolicy,
) -> (Vec<CommandNode>, ReorderOutcome) {
    let (mut pruned, captured) = remove_and_capture(forest, drag_id);
    let Some(captured) = captured else {
        debug!("drag node {} not found", drag_id);
        return (pruned, ReorderOutcome::DragNotFound(drag_id.clone()));
    };

    let Captured { node, parent, index } = captured;
    match insert_relative(&mut pruned, target_id, node, intent) {
        Ok(()) => (pruned, ReorderOutcome::Moved),
        Err(node) => {
            debug!("drop target {} not found, policy {:?}", target_id, policy);
            let restored = policy == DropPolicy::Restore;
            if restored {
                restore(
                    &mut pruned,
                    Captured {
                        node: node.clone(),
                        parent,
                        index,
                    },
                );
            }
            (
                pruned,
                ReorderOutcome::TargetNotFound {
                    target: target_id.clone(),
                    node: Box::new(node),
                    restored,
                },
            )
        }
    }
}

/// Delete a node together with its subtree.
pub fn remove_by_id(
    forest: Vec<CommandNode>,
    id: &CommandId,
) -> (Vec<CommandNode>, Option<CommandNode>) {
    let (forest, captured) = remove_and_capture(forest, id);
    (forest, captured.map(|c| c.node))
}

/// Append a new node at the root, or as last child of the group `parent`.
pub fn append_node(
    forest: &mut Vec<CommandNode>,
    parent: Option<&CommandId>,
    node: CommandNode,
) -> Result<(), DomainError> {
    match parent {
        None => {
            forest.push(node);
            Ok(())
        }
        Some(parent_id) => {
            let owner = find_by_id_mut(forest, parent_id)
                .ok_or_else(|| DomainError::NodeNotFound(parent_id.clone()))?;
            if !owner.is_group() {
                return Err(DomainError::NotAGroup(parent_id.clone()));
            }
            owner.push_child(node);
            Ok(())
        }
    }
}
