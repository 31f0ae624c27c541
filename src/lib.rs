//! rounddrop: a quick-launcher command tree
//!
//! Commands are kept as a forest of nodes (launchable commands and groups).
//! The tree can be rearranged by drag-and-drop style moves, renamed,
//! launched, and matched against the applications currently running.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
