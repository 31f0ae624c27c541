//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, CommandRunner, etc.)
//! but are themselves concrete structs, not traits.

mod commands;
mod icons;
mod identity;
mod running;

pub use commands::CommandService;
pub use icons::IconService;
pub use identity::{IdentityCache, IdentityService};
pub use running::{
    parse_identities, running_state, RunningAppsService, RunningAppsWatcher, RunningState,
};
