//! Whole-document persistence of the launcher document.
//!
//! Every save replaces the entire document; there is no per-node storage.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::tree::{depth, duplicate_ids, normalize};
use crate::domain::{DomainError, LauncherDocument};
use crate::infrastructure::traits::FileSystem;

/// Deepest nesting the TOML reader accepts back; array-of-tables headers
/// grow one segment per level and the parser caps its recursion.
pub const MAX_DEPTH: usize = 64;

/// Persistence collaborator: load and save the complete document.
pub trait DocumentStore: Send + Sync {
    /// Load the document; a missing document yields the defaults.
    fn load(&self) -> ApplicationResult<LauncherDocument>;

    /// Replace the stored document.
    fn save(&self, document: &LauncherDocument) -> ApplicationResult<()>;

    /// Location of the stored document, for display.
    fn location(&self) -> &Path;
}

/// TOML file backed document store.
pub struct TomlDocumentStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl TomlDocumentStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: PathBuf) -> Self {
        Self { fs, path }
    }

    fn document_err(&self, message: impl Into<String>) -> ApplicationError {
        ApplicationError::Document {
            path: self.path.clone(),
            message: message.into(),
        }
    }
}

impl DocumentStore for TomlDocumentStore {
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> ApplicationResult<LauncherDocument> {
        if !self.fs.exists(&self.path) {
            debug!("no document yet, using defaults");
            return Ok(LauncherDocument::default());
        }
        let content = self
            .fs
            .read_to_string(&self.path)
            .with_path_context("read command document", &self.path)?;
        let mut document: LauncherDocument =
            toml::from_str(&content).map_err(|e| self.document_err(e.to_string()))?;

        if let Some(id) = duplicate_ids(&document.commands).into_iter().next() {
            return Err(DomainError::DuplicateId(id).into());
        }
        document.commands = normalize(std::mem::take(&mut document.commands));
        debug!("loaded {} root commands", document.commands.len());
        Ok(document)
    }

    #[instrument(level = "debug", skip(self, document), fields(path = %self.path.display()))]
    fn save(&self, document: &LauncherDocument) -> ApplicationResult<()> {
        let mut document = document.clone();
        document.commands = normalize(document.commands);

        let levels = depth(&document.commands);
        if levels > MAX_DEPTH {
            return Err(self.document_err(format!(
                "nesting depth {levels} exceeds the maximum of {MAX_DEPTH}"
            )));
        }

        let content = toml::to_string_pretty(&document)
            .map_err(|e| self.document_err(format!("serialize: {e}")))?;
        self.fs
            .ensure_parent(&self.path)
            .with_path_context("create document directory", &self.path)?;
        self.fs
            .write_atomic(&self.path, &content)
            .with_path_context("write command document", &self.path)?;
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CommandNode;
    use crate::infrastructure::traits::RealFileSystem;
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> TomlDocumentStore {
        TomlDocumentStore::new(Arc::new(RealFileSystem), temp.path().join("commands.toml"))
    }

    #[test]
    fn given_missing_file_when_loading_then_returns_defaults() {
        let temp = TempDir::new().unwrap();
        let document = store(&temp).load().unwrap();
        assert_eq!(document, LauncherDocument::default());
    }

    #[test]
    fn given_nested_forest_when_saving_and_loading_then_structure_survives() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let document = LauncherDocument {
            commands: vec![
                CommandNode::group("g", "Tools").with_children(vec![
                    CommandNode::command("t", "Terminal", "/Applications/Terminal.app")
                        .with_identity("com.apple.Terminal"),
                ]),
                CommandNode::command("h", "Home", "/home/me"),
            ],
            ..Default::default()
        };

        store.save(&document).unwrap();

        assert_eq!(store.load().unwrap(), document);
    }

    fn nested(levels: usize) -> CommandNode {
        let mut node = CommandNode::command("leaf", "Leaf", "/leaf");
        for level in 1..levels {
            node = CommandNode::group(format!("g{level}"), format!("G{level}"))
                .with_children(vec![node]);
        }
        node
    }

    #[test]
    fn given_forest_at_max_depth_when_saving_and_loading_then_round_trips() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let document = LauncherDocument {
            commands: vec![nested(MAX_DEPTH)],
            ..Default::default()
        };

        store.save(&document).unwrap();

        assert_eq!(store.load().unwrap(), document);
    }

    #[test]
    fn given_forest_past_max_depth_when_saving_then_fails_and_keeps_previous_document() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let previous = LauncherDocument {
            commands: vec![CommandNode::command("h", "Home", "/home/me")],
            ..Default::default()
        };
        store.save(&previous).unwrap();

        let err = store
            .save(&LauncherDocument {
                commands: vec![nested(MAX_DEPTH + 1)],
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(err, ApplicationError::Document { .. }), "{err}");
        assert_eq!(store.load().unwrap(), previous);
    }

    #[test]
    fn given_empty_children_when_saving_then_written_as_absent() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let mut group = CommandNode::group("g", "Empty");
        group.children = Some(vec![]);
        let document = LauncherDocument {
            commands: vec![group],
            ..Default::default()
        };

        store.save(&document).unwrap();

        let raw = std::fs::read_to_string(store.location()).unwrap();
        assert!(!raw.contains("children"), "raw document: {raw}");
        assert!(store.load().unwrap().commands[0].children.is_none());
    }

    #[test]
    fn given_explicit_empty_children_on_disk_when_loading_then_normalized() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        std::fs::write(
            store.location(),
            "[[commands]]\nid = \"g\"\nkind = \"group\"\nlabel = \"G\"\nchildren = []\n",
        )
        .unwrap();

        let document = store.load().unwrap();

        assert!(document.commands[0].children.is_none());
    }

    #[test]
    fn given_duplicate_ids_on_disk_when_loading_then_rejects() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        std::fs::write(
            store.location(),
            "[[commands]]\nid = \"x\"\nlabel = \"A\"\ntarget = \"/a\"\n\n[[commands]]\nid = \"x\"\nlabel = \"B\"\ntarget = \"/b\"\n",
        )
        .unwrap();

        let err = store.load().unwrap_err();

        assert!(matches!(err, ApplicationError::Domain(DomainError::DuplicateId(_))));
    }
}
