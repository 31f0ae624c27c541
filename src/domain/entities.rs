//! Domain entities: core data structures

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, globally unique node identifier.
///
/// Assigned once at creation and never reused after deletion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(String);

impl CommandId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id for a newly created node.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommandId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CommandId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// What a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Launchable target (application, file or directory)
    #[default]
    Command,
    /// Pure container without a launch target
    Group,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Command => f.write_str("command"),
            NodeKind::Group => f.write_str("group"),
        }
    }
}

/// A node of the command tree.
///
/// `children` is `None` whenever the node has no children; an empty list is
/// never stored (see [`crate::domain::tree::normalize`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandNode {
    pub id: CommandId,
    #[serde(default)]
    pub kind: NodeKind,
    pub label: String,
    /// Launch target; only meaningful for [`NodeKind::Command`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// External identity token (e.g. bundle identifier) used for running-state lookups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    /// Reference to an extracted icon image, relative to the images directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<CommandNode>>,
}

impl CommandNode {
    pub fn command(
        id: impl Into<CommandId>,
        label: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Command,
            label: label.into(),
            target: Some(target.into()),
            identity: None,
            icon: None,
            children: None,
        }
    }

    pub fn group(id: impl Into<CommandId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Group,
            label: label.into(),
            target: None,
            identity: None,
            icon: None,
            children: None,
        }
    }

    /// Builder-style helper, mostly for fixtures.
    pub fn with_children(mut self, children: Vec<CommandNode>) -> Self {
        self.children = if children.is_empty() {
            None
        } else {
            Some(children)
        };
        self
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn is_group(&self) -> bool {
        self.kind == NodeKind::Group
    }

    pub fn children(&self) -> &[CommandNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// Append a child, creating the children list if absent.
    pub fn push_child(&mut self, child: CommandNode) {
        self.children.get_or_insert_with(Vec::new).push(child);
    }
}

impl fmt::Display for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.target) {
            (NodeKind::Command, Some(target)) => {
                write!(f, "{} [{}] -> {}", self.label, self.id, target)
            }
            _ => write!(f, "{} [{}]", self.label, self.id),
        }
    }
}

/// Ordered sequence of root-level nodes.
pub type Forest = Vec<CommandNode>;

/// Where a dragged node lands relative to the drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropIntent {
    /// Last child of the target
    Into,
    /// Next sibling after the target
    After,
    /// Sibling immediately before the target
    Before,
}

impl fmt::Display for DropIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropIntent::Into => f.write_str("into"),
            DropIntent::After => f.write_str("after"),
            DropIntent::Before => f.write_str("before"),
        }
    }
}

/// What happens to a captured node whose drop target no longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPolicy {
    /// Drop the node from the visible tree
    #[default]
    Discard,
    /// Put the node back where it was captured
    Restore,
}

/// Pixel sizes selectable through the document's `icon_size` index.
pub const ICON_SIZES: [u32; 4] = [24, 32, 48, 64];

/// Keyboard shortcuts stored with the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shortcuts {
    /// Accelerator toggling the launcher
    pub toggle_command: String,
}

impl Default for Shortcuts {
    fn default() -> Self {
        Self {
            toggle_command: "Control+Alt+Z".to_string(),
        }
    }
}

/// The whole persisted document: settings edited in the UI plus the command forest.
///
/// This is the unit of persistence; every edit replaces the complete document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherDocument {
    /// Index into [`ICON_SIZES`]
    pub icon_size: u8,
    pub shortcuts: Shortcuts,
    pub commands: Forest,
}

impl Default for LauncherDocument {
    fn default() -> Self {
        Self {
            icon_size: 2,
            shortcuts: Shortcuts::default(),
            commands: Vec::new(),
        }
    }
}

impl LauncherDocument {
    /// Icon edge length in pixels, `None` for an out-of-range index.
    pub fn icon_pixels(&self) -> Option<u32> {
        ICON_SIZES.get(usize::from(self.icon_size)).copied()
    }
}
