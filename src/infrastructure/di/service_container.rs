//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{
    CommandService, IconService, IdentityCache, IdentityService, RunningAppsService,
};
use crate::config::Settings;
use crate::infrastructure::store::{DocumentStore, TomlDocumentStore};
use crate::infrastructure::traits::{
    BundleIconExtractor, CommandRunner, FileSystem, IconExtractor, RealCommandRunner,
    RealFileSystem,
};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Command runner abstraction (opener and running probe)
    pub cmd: Arc<dyn CommandRunner>,

    /// Persistence of the command document
    pub store: Arc<dyn DocumentStore>,

    /// Identity memo, shared by every resolver in this process
    pub identity_cache: Arc<IdentityCache>,

    pub icons: Arc<IconService>,
    pub identity: Arc<IdentityService>,
    pub commands: Arc<CommandService>,
    pub running: Arc<RunningAppsService>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(RealCommandRunner),
            Arc::new(BundleIconExtractor::default()),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        extractor: Arc<dyn IconExtractor>,
    ) -> Self {
        let settings = Arc::new(settings);

        let store: Arc<dyn DocumentStore> =
            Arc::new(TomlDocumentStore::new(fs.clone(), settings.document_path()));
        let identity_cache = Arc::new(IdentityCache::new());
        let icons = Arc::new(IconService::new(
            fs.clone(),
            extractor,
            settings.images_dir(),
        ));
        let identity = Arc::new(IdentityService::new(
            fs.clone(),
            identity_cache.clone(),
            settings.bundle_extensions.clone(),
        ));
        let commands = Arc::new(CommandService::new(
            store.clone(),
            icons.clone(),
            identity.clone(),
            cmd.clone(),
            settings.opener.clone(),
            settings.drop_policy,
        ));
        let running = Arc::new(RunningAppsService::new(
            cmd.clone(),
            settings.running.clone(),
        ));

        Self {
            settings,
            fs,
            cmd,
            store,
            identity_cache,
            icons,
            identity,
            commands,
            running,
        }
    }
}
