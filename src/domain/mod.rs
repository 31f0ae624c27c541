//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod edit;
pub mod entities;
pub mod error;
pub mod tree;

pub use edit::{
    append_node, insert_relative, remove_and_capture, remove_by_id, reorder,
    reorder_with_policy, Captured, ReorderOutcome,
};
pub use entities::*;
pub use error::DomainError;
pub use tree::{find_by_id, rename_by_id, sibling_list_containing};
