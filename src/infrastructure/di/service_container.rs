//! Service container for dependency injection
//!
//! Wires up the hierarchy service with its store and seed data.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::HierarchyService;
use crate::application::{load_seed_file, sample_forests, ApplicationResult};
use crate::config::Settings;
use crate::domain::EntityData;
use crate::infrastructure::store::JsonFileStore;
use crate::infrastructure::traits::{FileSystem, ForestStore, RealFileSystem};

/// Container holding the application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Store the hierarchy service commits to
    pub store: Arc<dyn ForestStore>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let store = Arc::new(JsonFileStore::new(fs.clone(), settings.data_file.clone()));
        Self::with_deps(settings, fs, store)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        store: Arc<dyn ForestStore>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            store,
        }
    }

    /// Seed forests selected by the settings: built-in samples, then the seed file.
    pub fn seed(&self) -> ApplicationResult<Vec<EntityData>> {
        let mut seed = Vec::new();
        if self.settings.include_samples {
            seed.extend(sample_forests());
        }
        if let Some(path) = &self.settings.seed_file {
            seed.extend(load_seed_file(self.fs.as_ref(), path)?);
        }
        debug!("seed: {} forests", seed.len());
        Ok(seed)
    }

    /// Load the hierarchy service from the store and seed data.
    pub fn hierarchy(&self) -> ApplicationResult<HierarchyService> {
        HierarchyService::load(self.store.clone(), self.seed()?)
    }
}
