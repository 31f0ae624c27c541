//! Command tree service
//!
//! Every edit follows the same cycle: load the whole document, transform the
//! forest with a pure domain operation, save the whole document.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::application::services::{IconService, IdentityService};
use crate::domain::tree::{find_by_id, iter, rename_by_id, sibling_list_containing};
use crate::domain::{
    append_node, remove_by_id, reorder_with_policy, CommandId, CommandNode, DomainError,
    DropIntent, DropPolicy, Forest, LauncherDocument, ReorderOutcome, ICON_SIZES,
};
use crate::infrastructure::store::DocumentStore;
use crate::infrastructure::traits::CommandRunner;
use crate::util::path::label_from_target;

/// Service for editing and launching commands.
pub struct CommandService {
    store: Arc<dyn DocumentStore>,
    icons: Arc<IconService>,
    identity: Arc<IdentityService>,
    cmd: Arc<dyn CommandRunner>,
    opener: String,
    drop_policy: DropPolicy,
}

impl CommandService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        icons: Arc<IconService>,
        identity: Arc<IdentityService>,
        cmd: Arc<dyn CommandRunner>,
        opener: String,
        drop_policy: DropPolicy,
    ) -> Self {
        Self {
            store,
            icons,
            identity,
            cmd,
            opener,
            drop_policy,
        }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn load(&self) -> ApplicationResult<LauncherDocument> {
        self.store.load()
    }

    pub fn forest(&self) -> ApplicationResult<Forest> {
        Ok(self.store.load()?.commands)
    }

    pub fn find(&self, id: &CommandId) -> ApplicationResult<CommandNode> {
        let forest = self.forest()?;
        find_by_id(&forest, id)
            .cloned()
            .ok_or_else(|| DomainError::NodeNotFound(id.clone()).into())
    }

    /// The sibling list holding `id`; the root list for `None`.
    pub fn level(&self, id: Option<&CommandId>) -> ApplicationResult<Forest> {
        let forest = self.forest()?;
        match id {
            None => Ok(forest),
            Some(id) => sibling_list_containing(&forest, id)
                .map(<[CommandNode]>::to_vec)
                .ok_or_else(|| DomainError::NodeNotFound(id.clone()).into()),
        }
    }

    /// Add a launchable command, at the root or inside the group `into`.
    #[instrument(level = "debug", skip(self))]
    pub fn add_command(
        &self,
        target: &str,
        label: Option<&str>,
        into: Option<&CommandId>,
    ) -> ApplicationResult<CommandNode> {
        let mut document = self.store.load()?;

        let id = CommandId::generate();
        let label = label
            .map(str::to_string)
            .unwrap_or_else(|| label_from_target(target));
        let mut node = CommandNode::command(id.clone(), label, target);
        node.icon = self.icons.store_icon(&id, target);
        if self.identity.is_bundle(target) {
            node.identity = self.identity.resolve(target);
        }

        if let Err(e) = append_node(&mut document.commands, into, node.clone()) {
            // Nothing references the icon now
            self.icons.release(&id);
            return Err(e.into());
        }
        if let Err(e) = self.store.save(&document) {
            self.icons.release(&id);
            return Err(e);
        }
        info!("added command {} ({})", node.label, node.id);
        Ok(node)
    }

    /// Add an empty group, at the root or inside the group `into`.
    #[instrument(level = "debug", skip(self))]
    pub fn add_group(
        &self,
        label: &str,
        into: Option<&CommandId>,
    ) -> ApplicationResult<CommandNode> {
        let mut document = self.store.load()?;
        let node = CommandNode::group(CommandId::generate(), label);
        append_node(&mut document.commands, into, node.clone())?;
        self.store.save(&document)?;
        info!("added group {} ({})", node.label, node.id);
        Ok(node)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn rename(&self, id: &CommandId, label: &str) -> ApplicationResult<()> {
        let mut document = self.store.load()?;
        if find_by_id(&document.commands, id).is_none() {
            return Err(DomainError::NodeNotFound(id.clone()).into());
        }
        document.commands = rename_by_id(std::mem::take(&mut document.commands), id, label);
        self.store.save(&document)
    }

    /// Drag-and-drop move.
    ///
    /// A missing drag id leaves the document untouched; a missing target
    /// applies the configured drop policy and saves the result.
    #[instrument(level = "debug", skip(self))]
    pub fn move_node(
        &self,
        drag_id: &CommandId,
        target_id: &CommandId,
        intent: DropIntent,
    ) -> ApplicationResult<ReorderOutcome> {
        let mut document = self.store.load()?;
        let (forest, outcome) = reorder_with_policy(
            std::mem::take(&mut document.commands),
            drag_id,
            target_id,
            intent,
            self.drop_policy,
        );

        match &outcome {
            ReorderOutcome::DragNotFound(id) => {
                debug!("nothing to move: {} not found", id);
                return Ok(outcome);
            }
            ReorderOutcome::TargetNotFound { node, restored, .. } => {
                warn!(
                    "drop target {} vanished, {} {}",
                    target_id,
                    if *restored { "restored" } else { "discarded" },
                    node.id
                );
                if !restored {
                    self.release_subtree(node);
                }
            }
            ReorderOutcome::Moved => {}
        }

        document.commands = forest;
        self.store.save(&document)?;
        Ok(outcome)
    }

    /// Delete a node with its subtree and release their icons.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(&self, id: &CommandId) -> ApplicationResult<CommandNode> {
        let mut document = self.store.load()?;
        let (forest, removed) = remove_by_id(std::mem::take(&mut document.commands), id);
        let removed = removed.ok_or_else(|| DomainError::NodeNotFound(id.clone()))?;

        document.commands = forest;
        self.store.save(&document)?;
        self.release_subtree(&removed);
        info!("deleted {} ({} nodes)", removed.id, iter(std::slice::from_ref(&removed)).count());
        Ok(removed)
    }

    fn release_subtree(&self, node: &CommandNode) {
        for n in iter(std::slice::from_ref(node)) {
            self.icons.release(&n.id);
        }
    }

    /// Launch a command node's target with the configured opener.
    #[instrument(level = "debug", skip(self))]
    pub fn launch(&self, id: &CommandId) -> ApplicationResult<CommandNode> {
        let node = self.find(id)?;
        let target = match (node.is_group(), node.target.as_deref()) {
            (false, Some(target)) if !target.is_empty() => target.to_string(),
            _ => return Err(DomainError::NotLaunchable(id.clone()).into()),
        };

        let output = self
            .cmd
            .run(&self.opener, &[target.as_str()])
            .with_context(format!("launch {} with {}", target, self.opener))?;
        if !output.status.success() {
            return Err(ApplicationError::OperationFailed {
                context: format!("{} {} exited with {}", self.opener, target, output.status),
                source: String::from_utf8_lossy(&output.stderr).trim().to_string().into(),
            });
        }
        info!("launched {}", target);
        Ok(node)
    }

    /// Resolve missing identities; saves only when something changed.
    #[instrument(level = "debug", skip(self))]
    pub fn backfill_identities(&self) -> ApplicationResult<bool> {
        let mut document = self.store.load()?;
        let (forest, changed) = self.identity.backfill(std::mem::take(&mut document.commands));
        if changed {
            document.commands = forest;
            self.store.save(&document)?;
        }
        Ok(changed)
    }

    pub fn set_shortcut(&self, accelerator: &str) -> ApplicationResult<()> {
        let mut document = self.store.load()?;
        document.shortcuts.toggle_command = accelerator.to_string();
        self.store.save(&document)
    }

    pub fn set_icon_size(&self, index: u8) -> ApplicationResult<()> {
        if usize::from(index) >= ICON_SIZES.len() {
            return Err(DomainError::InvalidIconSize(index).into());
        }
        let mut document = self.store.load()?;
        document.icon_size = index;
        self.store.save(&document)
    }
}
