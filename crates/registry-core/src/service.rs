//! Registry operations: list, register, deregister, pinned defaults.
//!
//! The service owns no module state of its own: every read goes back to the
//! store, so multiple service instances sharing one store stay consistent.

use crate::broadcast::Broadcaster;
use crate::error::{RegistryError, Result};
use crate::schema::{ChangeEvent, ModuleRecord};
use crate::store::ModuleStore;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Entry point for registry mutations and queries.
#[derive(Clone)]
pub struct RegistryService {
    store: Arc<dyn ModuleStore>,
    broadcaster: Arc<Broadcaster>,
}

impl RegistryService {
    pub fn new(store: Arc<dyn ModuleStore>, broadcaster: Arc<Broadcaster>) -> Self {
        Self { store, broadcaster }
    }

    /// The broadcaster event streams subscribe to.
    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.broadcaster
    }

    /// All currently-registered modules, unordered.
    pub async fn list_modules(&self) -> Result<Vec<ModuleRecord>> {
        let raw = self.store.get_all().await?;
        raw.iter()
            .map(|manifest| serde_json::from_str(manifest).map_err(RegistryError::from))
            .collect()
    }

    /// Store a module manifest and notify subscribers.
    ///
    /// Registering an id that already exists replaces the prior record
    /// atomically; replacement is the defined policy, not an error.
    pub async fn register_module(&self, record: ModuleRecord) -> Result<ModuleRecord> {
        record.validate()?;

        let manifest = serde_json::to_string(&record)?;
        self.store.set(&record.id, &manifest).await?;

        info!("Registered module '{}' v{}", record.id, record.version);
        self.broadcaster.publish(&ChangeEvent::added(record.clone()))?;

        Ok(record)
    }

    /// Remove a module and notify subscribers.
    ///
    /// Fails with `ModuleNotFound`, emitting nothing, when the id is not
    /// registered.
    pub async fn deregister_module(&self, id: &str) -> Result<()> {
        let removed = self.store.delete(id).await?;
        if !removed {
            return Err(RegistryError::ModuleNotFound { id: id.to_string() });
        }

        info!("Deregistered module '{}'", id);
        self.broadcaster.publish(&ChangeEvent::removed(id))?;

        Ok(())
    }

    /// Round-trip check that the store is reachable.
    pub async fn health(&self) -> Result<()> {
        self.store.ping().await
    }

    /// Seed pinned default modules from a JSON definition file.
    ///
    /// Each entry overwrites any existing record with the same id; live
    /// self-registration later overwrites the pinned entry in turn. Failures
    /// are logged and non-fatal; the service continues with whatever state
    /// the store already has. Returns the number of modules seeded.
    pub async fn load_pinned_defaults(&self, path: &Path) -> usize {
        match self.try_load_pinned(path).await {
            Ok(count) => {
                info!("Loaded {} pinned module(s) from {}", count, path.display());
                count
            }
            Err(e) => {
                warn!("Could not load pinned modules from {}: {}", path.display(), e);
                0
            }
        }
    }

    async fn try_load_pinned(&self, path: &Path) -> Result<usize> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RegistryError::PinnedLoad {
                message: format!("failed to read {}: {}", path.display(), e),
            })?;

        let pinned: Vec<ModuleRecord> =
            serde_json::from_str(&content).map_err(|e| RegistryError::PinnedLoad {
                message: format!("failed to parse {}: {}", path.display(), e),
            })?;

        // Seeding bypasses change events. There are no subscribers before
        // the server starts, and startup state is queried, not pushed.
        for record in &pinned {
            let manifest = serde_json::to_string(record)?;
            self.store.set(&record.id, &manifest).await?;
        }

        Ok(pinned.len())
    }
}
