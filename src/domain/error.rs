//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::CommandId;

/// Domain errors represent tree-level lookups that came up empty or
/// requests the tree shape cannot satisfy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("drag node not found: {0}")]
    DragNotFound(CommandId),

    #[error("drop target not found: {0}")]
    TargetNotFound(CommandId),

    #[error("command not found: {0}")]
    NodeNotFound(CommandId),

    #[error("not launchable (group or missing target): {0}")]
    NotLaunchable(CommandId),

    #[error("not a group: {0}")]
    NotAGroup(CommandId),

    #[error("duplicate command id: {0}")]
    DuplicateId(CommandId),

    #[error("icon size index out of range: {0}")]
    InvalidIconSize(u8),
}
