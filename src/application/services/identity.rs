//! Identity resolution for launch targets
//!
//! Maps an application bundle to its bundle identifier so running-state
//! reports can be matched against command nodes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::domain::{CommandNode, Forest, NodeKind};
use crate::infrastructure::traits::FileSystem;
use crate::util::path::has_extension;

/// Memo of resolved identities keyed by launch target.
///
/// Misses are cached too (`None`), so a target without identity is read once.
#[derive(Debug, Default)]
pub struct IdentityCache {
    entries: Mutex<HashMap<PathBuf, Option<String>>>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PathBuf, Option<String>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Outer `None`: never resolved. Inner `None`: resolved, no identity.
    pub fn get(&self, target: &Path) -> Option<Option<String>> {
        self.entries().get(target).cloned()
    }

    pub fn insert(&self, target: PathBuf, identity: Option<String>) {
        self.entries().insert(target, identity);
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}

/// Resolves and backfills identity tokens.
pub struct IdentityService {
    fs: Arc<dyn FileSystem>,
    cache: Arc<IdentityCache>,
    bundle_extensions: Vec<String>,
    bundle_id: Regex,
}

impl IdentityService {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        cache: Arc<IdentityCache>,
        bundle_extensions: Vec<String>,
    ) -> Self {
        Self {
            fs,
            cache,
            bundle_extensions,
            bundle_id: Regex::new(
                r"<key>\s*CFBundleIdentifier\s*</key>\s*<string>\s*([^<]+?)\s*</string>",
            )
            .expect("CFBundleIdentifier pattern is valid"),
        }
    }

    pub fn cache(&self) -> &Arc<IdentityCache> {
        &self.cache
    }

    /// True if identities can be resolved for this target.
    pub fn is_bundle(&self, target: &str) -> bool {
        has_extension(target, &self.bundle_extensions)
    }

    /// Bundle identifier of `target`, memoized per target.
    ///
    /// Read failures are logged and resolve to `None`.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve(&self, target: &str) -> Option<String> {
        let key = PathBuf::from(target);
        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }

        let plist_path = key.join("Contents").join("Info.plist");
        let identity = match self.fs.read_to_string(&plist_path) {
            Ok(content) => {
                let found = self
                    .bundle_id
                    .captures(&content)
                    .map(|caps| caps[1].to_string());
                if found.is_none() {
                    warn!("no CFBundleIdentifier in {}", plist_path.display());
                }
                found
            }
            Err(e) => {
                warn!("failed to read {}: {}", plist_path.display(), e);
                None
            }
        };

        self.cache.insert(key, identity.clone());
        identity
    }

    /// Fill missing identities on command nodes with bundle targets.
    ///
    /// Returns the new forest and whether any node changed.
    #[instrument(level = "debug", skip(self, forest))]
    pub fn backfill(&self, forest: Forest) -> (Forest, bool) {
        let mut changed = false;
        let forest = forest
            .into_iter()
            .map(|node| self.backfill_node(node, &mut changed))
            .collect();
        debug!("backfill changed: {}", changed);
        (forest, changed)
    }

    fn backfill_node(&self, mut node: CommandNode, changed: &mut bool) -> CommandNode {
        if node.kind == NodeKind::Command && node.identity.is_none() {
            if let Some(target) = node.target.as_deref().filter(|t| self.is_bundle(t)) {
                if let Some(identity) = self.resolve(target) {
                    node.identity = Some(identity);
                    *changed = true;
                }
            }
        }
        if let Some(children) = node.children.take() {
            node.children = Some(
                children
                    .into_iter()
                    .map(|child| self.backfill_node(child, changed))
                    .collect(),
            );
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::RealFileSystem;
    use tempfile::TempDir;

    fn write_bundle(temp: &TempDir, name: &str, identifier: &str) -> String {
        let bundle = temp.path().join(name);
        std::fs::create_dir_all(bundle.join("Contents")).unwrap();
        std::fs::write(
            bundle.join("Contents/Info.plist"),
            format!(
                "<?xml version=\"1.0\"?>\n<plist><dict>\n  <key>CFBundleIdentifier</key>\n  <string>{identifier}</string>\n</dict></plist>\n"
            ),
        )
        .unwrap();
        bundle.to_string_lossy().into_owned()
    }

    fn service(cache: Arc<IdentityCache>) -> IdentityService {
        IdentityService::new(Arc::new(RealFileSystem), cache, vec!["app".into()])
    }

    #[test]
    fn given_bundle_when_resolving_then_reads_identifier_and_caches() {
        let temp = TempDir::new().unwrap();
        let target = write_bundle(&temp, "Demo.app", "com.example.demo");
        let cache = Arc::new(IdentityCache::new());
        let service = service(cache.clone());

        assert_eq!(service.resolve(&target), Some("com.example.demo".to_string()));
        assert_eq!(cache.len(), 1);

        // Cached value wins even after the bundle disappears
        std::fs::remove_dir_all(temp.path().join("Demo.app")).unwrap();
        assert_eq!(service.resolve(&target), Some("com.example.demo".to_string()));
    }

    #[test]
    fn given_missing_plist_when_resolving_then_caches_miss() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("Ghost.app").to_string_lossy().into_owned();
        let cache = Arc::new(IdentityCache::new());
        let service = service(cache.clone());

        assert_eq!(service.resolve(&target), None);
        assert_eq!(cache.get(Path::new(&target)), Some(None));
    }

    #[test]
    fn given_cleared_cache_when_resolving_then_reads_again() {
        let temp = TempDir::new().unwrap();
        let target = write_bundle(&temp, "Demo.app", "com.example.one");
        let cache = Arc::new(IdentityCache::new());
        let service = service(cache.clone());
        service.resolve(&target);

        write_bundle(&temp, "Demo.app", "com.example.two");
        cache.clear();

        assert_eq!(service.resolve(&target), Some("com.example.two".to_string()));
    }
}
