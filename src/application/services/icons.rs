//! Icon storage keyed by command id

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::CommandId;
use crate::infrastructure::traits::{FileSystem, IconExtractor};
use crate::util::path::resolve_within;

/// Extracts icons for launch targets and stores them as `<images_dir>/<id>.<ext>`.
pub struct IconService {
    fs: Arc<dyn FileSystem>,
    extractor: Arc<dyn IconExtractor>,
    images_dir: PathBuf,
}

impl IconService {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        extractor: Arc<dyn IconExtractor>,
        images_dir: PathBuf,
    ) -> Self {
        Self {
            fs,
            extractor,
            images_dir,
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Extract and store the icon of `target` for `id`.
    ///
    /// Returns the icon reference (file name inside the images directory),
    /// or `None` when no icon could be produced.
    #[instrument(level = "debug", skip(self))]
    pub fn store_icon(&self, id: &CommandId, target: &str) -> Option<String> {
        match self.try_store_icon(id, target) {
            Ok(reference) => Some(reference),
            Err(e) => {
                warn!("no icon for {}: {}", target, e);
                None
            }
        }
    }

    fn try_store_icon(&self, id: &CommandId, target: &str) -> ApplicationResult<String> {
        let image = self
            .extractor
            .extract(Path::new(target))
            .with_context(format!("extract icon from {target}"))?;

        let reference = format!("{}.{}", id, image.extension);
        let path = self.images_dir.join(&reference);
        self.fs
            .create_dir_all(&self.images_dir)
            .with_path_context("create images directory", &self.images_dir)?;
        self.fs
            .write_bytes(&path, &image.bytes)
            .with_path_context("write icon", &path)?;
        debug!("stored icon {}", path.display());
        Ok(reference)
    }

    /// Remove every stored icon of `id`. Failures are logged, never raised.
    #[instrument(level = "debug", skip(self))]
    pub fn release(&self, id: &CommandId) {
        if !self.fs.is_dir(&self.images_dir) {
            return;
        }
        for entry in WalkDir::new(&self.images_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let matches = path
                .file_stem()
                .map(|stem| stem.to_string_lossy() == id.as_str())
                .unwrap_or(false);
            if !matches {
                continue;
            }
            match self.fs.remove_file(path) {
                Ok(()) => debug!("released icon {}", path.display()),
                Err(e) => warn!("failed to remove icon {}: {}", path.display(), e),
            }
        }
    }

    /// Filesystem path of an icon reference, if it stays inside the images directory.
    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        resolve_within(&self.images_dir, reference)
    }
}
