//! In-memory module store for tests.

use super::ModuleStore;
use crate::error::{RegistryError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Hash-map store with a switchable "unreachable" mode for failure tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with `StoreUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RegistryError::StoreUnavailable {
                message: "memory store marked unavailable".to_string(),
                source: None,
            });
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| RegistryError::Other(format!("Failed to acquire store lock: {}", e)))
    }
}

#[async_trait]
impl ModuleStore for MemoryStore {
    async fn set(&self, id: &str, manifest: &str) -> Result<()> {
        self.check_available()?;
        self.lock()?.insert(id.to_string(), manifest.to_string());
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<String>> {
        self.check_available()?;
        Ok(self.lock()?.values().cloned().collect())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        self.check_available()?;
        Ok(self.lock()?.remove(id).is_some())
    }

    async fn ping(&self) -> Result<()> {
        self.check_available()
    }
}
