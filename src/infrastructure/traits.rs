//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::Path;
use std::process::Output;

use regex::Regex;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Read file contents as raw bytes.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Write raw bytes to file.
    fn write_bytes(&self, path: &Path, content: &[u8]) -> io::Result<()>;

    /// Replace a file in one step: write a sibling temp file, then rename it over `path`.
    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// External command runner abstraction.
pub trait CommandRunner: Send + Sync {
    /// Run a command with arguments.
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output>;
}

/// Item for FZF-style selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionItem {
    /// Display text shown in selector
    pub display: String,
    /// Actual value (the command id)
    pub value: String,
}

/// Interactive FZF-style selector abstraction.
pub trait Selector: Send + Sync {
    /// Present items to user and return selected one.
    /// Returns None if user cancels (Esc/Ctrl-C).
    fn select_one(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<SelectionItem>, String>;
}

/// Editor abstraction for opening files.
pub trait Editor: Send + Sync {
    /// Open a file in the editor.
    /// Blocks until editor exits.
    fn open(&self, path: &Path) -> io::Result<()>;
}

/// Raw icon image plus the file extension it should be stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconImage {
    pub bytes: Vec<u8>,
    pub extension: String,
}

/// Produces an icon image for a launch target.
pub trait IconExtractor: Send + Sync {
    fn extract(&self, target: &Path) -> io::Result<IconImage>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn write_bytes(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()> {
        use std::io::Write;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Real command runner implementation.
#[derive(Debug, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output> {
        std::process::Command::new(cmd).args(args).output()
    }
}

/// Real selector implementation using skim (FZF-like).
#[derive(Debug, Default)]
pub struct SkimSelector;

/// Real editor implementation: the configured command, else $VISUAL, $EDITOR or vim.
#[derive(Debug, Default)]
pub struct EnvironmentEditor {
    command: Option<String>,
}

impl EnvironmentEditor {
    pub fn new(command: impl Into<String>) -> Self {
        let command = command.into();
        Self {
            command: (!command.trim().is_empty()).then_some(command),
        }
    }

    /// Editor command that `open` will spawn.
    pub fn command(&self) -> String {
        self.command.clone().unwrap_or_else(|| {
            std::env::var("VISUAL")
                .or_else(|_| std::env::var("EDITOR"))
                .unwrap_or_else(|_| "vim".to_string())
        })
    }
}

impl Selector for SkimSelector {
    fn select_one(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<SelectionItem>, String> {
        use skim::prelude::*;
        use std::io::Cursor;

        if items.is_empty() {
            return Ok(None);
        }

        // Build input as newline-separated display strings
        let input = items
            .iter()
            .map(|i| i.display.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let options = SkimOptionsBuilder::default()
            .prompt(Some(prompt))
            .height(Some("50%"))
            .multi(false)
            .build()
            .map_err(|e| format!("failed to build skim options: {e}"))?;

        let item_reader = SkimItemReader::default();
        let items_arc = item_reader.of_bufread(Cursor::new(input));

        let output = Skim::run_with(&options, Some(items_arc));

        match output {
            Some(out) if out.is_abort => Ok(None),
            Some(out) => {
                if let Some(selected) = out.selected_items.first() {
                    let display = selected.output().to_string();
                    let item = items.iter().find(|i| i.display == display).cloned();
                    Ok(item)
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }
}

impl Editor for EnvironmentEditor {
    fn open(&self, path: &Path) -> io::Result<()> {
        use std::process::Command;

        let editor = self.command();
        let status = Command::new(&editor).arg(path).status()?;

        if status.success() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("editor exited with status: {}", status),
            ))
        }
    }
}

/// Icon extractor for application bundles.
///
/// Reads `CFBundleIconFile` from `Contents/Info.plist` and returns the
/// referenced file from `Contents/Resources`. Anything that is not a
/// bundle with an XML plist yields `NotFound`.
#[derive(Debug)]
pub struct BundleIconExtractor {
    icon_key: Regex,
}

impl Default for BundleIconExtractor {
    fn default() -> Self {
        Self {
            icon_key: Regex::new(
                r"<key>\s*CFBundleIconFile\s*</key>\s*<string>\s*([^<]+?)\s*</string>",
            )
            .expect("CFBundleIconFile pattern is valid"),
        }
    }
}

impl IconExtractor for BundleIconExtractor {
    fn extract(&self, target: &Path) -> io::Result<IconImage> {
        let contents = target.join("Contents");
        let plist = std::fs::read_to_string(contents.join("Info.plist"))?;
        let name = self
            .icon_key
            .captures(&plist)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no CFBundleIconFile in {}", target.display()),
                )
            })?;

        let mut icon_path = contents.join("Resources").join(&name);
        if icon_path.extension().is_none() {
            icon_path.set_extension("icns");
        }
        let extension = icon_path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "icns".to_string());

        Ok(IconImage {
            bytes: std::fs::read(&icon_path)?,
            extension,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_configured_editor_when_resolving_then_uses_it_over_environment() {
        assert_eq!(EnvironmentEditor::new("nano").command(), "nano");
        assert_eq!(
            EnvironmentEditor::new("  ").command(),
            EnvironmentEditor::default().command()
        );
    }

    #[test]
    fn given_bundle_with_icon_file_when_extracting_then_reads_icns() {
        let temp = TempDir::new().unwrap();
        let bundle = temp.path().join("Demo.app");
        std::fs::create_dir_all(bundle.join("Contents/Resources")).unwrap();
        std::fs::write(
            bundle.join("Contents/Info.plist"),
            "<plist><dict><key>CFBundleIconFile</key>\n<string>AppIcon</string></dict></plist>",
        )
        .unwrap();
        std::fs::write(bundle.join("Contents/Resources/AppIcon.icns"), b"icns-bytes").unwrap();

        let image = BundleIconExtractor::default().extract(&bundle).unwrap();

        assert_eq!(image.extension, "icns");
        assert_eq!(image.bytes, b"icns-bytes".to_vec());
    }

    #[test]
    fn given_plain_file_when_extracting_then_fails() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("notes.txt");
        std::fs::write(&file, "hello").unwrap();

        assert!(BundleIconExtractor::default().extract(&file).is_err());
    }

    #[test]
    fn given_existing_file_when_write_atomic_then_replaces_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.toml");
        std::fs::write(&path, "old").unwrap();

        RealFileSystem.write_atomic(&path, "new").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }
}
