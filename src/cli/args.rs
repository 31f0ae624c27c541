//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::DropIntent;

/// Quick-launcher command tree: organize, reorder and launch commands
#[derive(Parser, Debug)]
#[command(name = "rounddrop")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: ~/.config/rounddrop/rounddrop.toml)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the command tree
    Tree,

    /// Show one command and its path
    Find {
        /// Command id
        id: String,
    },

    /// List the siblings of a command (root level if omitted)
    Level {
        /// Command id
        id: Option<String>,
    },

    /// Add a launchable command
    Add {
        /// Launch target (application bundle, file, or URL)
        #[arg(value_hint = ValueHint::AnyPath)]
        target: String,
        /// Display label (default: target file name without .app)
        #[arg(short, long)]
        label: Option<String>,
        /// Group to add into (default: root)
        #[arg(short, long)]
        into: Option<String>,
    },

    /// Add an empty group
    AddGroup {
        /// Display label
        label: String,
        /// Group to add into (default: root)
        #[arg(short, long)]
        into: Option<String>,
    },

    /// Rename a command or group
    Rename {
        /// Command id
        id: String,
        /// New label
        label: String,
    },

    /// Move a command relative to another one
    Move {
        /// Id of the command being moved
        drag: String,
        /// Id of the drop target
        target: String,
        /// Where to drop relative to the target
        #[arg(short = 'I', long, value_enum, default_value_t = IntentArg::After)]
        intent: IntentArg,
    },

    /// Delete a command or group (with its contents)
    Delete {
        /// Command id
        id: String,
    },

    /// Launch a command
    Open {
        /// Command id
        id: String,
    },

    /// Select a command interactively (fzf) and launch it
    Select,

    /// Resolve missing application identities
    Backfill,

    /// Show which commands are running
    Running {
        /// Keep polling and print changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Show or set the toggle shortcut
    Shortcut {
        /// Accelerator, e.g. "Control+Alt+Z"
        accelerator: Option<String>,
    },

    /// Show or set the icon size index
    IconSize {
        /// Index into 24, 32, 48, 64
        index: Option<u8>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config and data paths
    Path,

    /// Edit config file
    Edit,
}

/// Drop intent as given on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentArg {
    /// Become the last child of the target
    Into,
    /// Directly after the target, same level
    After,
    /// Directly before the target, same level
    Before,
}

impl From<IntentArg> for DropIntent {
    fn from(arg: IntentArg) -> Self {
        match arg {
            IntentArg::Into => DropIntent::Into,
            IntentArg::After => DropIntent::After,
            IntentArg::Before => DropIntent::Before,
        }
    }
}
