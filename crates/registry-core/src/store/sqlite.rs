//! SQLite-backed module store.
//!
//! Uses WAL mode for safe concurrent access across processes and
//! `Arc<Mutex<Connection>>` for thread safety within a process.

use super::ModuleStore;
use crate::config::StoreConfig;
use crate::error::{RegistryError, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// SQLite store holding one row per registered module.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open the store at a specific path.
    ///
    /// Creates the database and parent directories if they don't exist.
    pub fn open_at(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| RegistryError::io_with_path(e, parent))?;
            }
        }

        let conn = Connection::open(db_path)?;
        Self::configure_connection(&conn)?;
        Self::ensure_schema(&conn)?;

        debug!("Opened module store at {}", db_path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode=WAL;\n\
             PRAGMA busy_timeout={};\n\
             PRAGMA synchronous=NORMAL;",
            StoreConfig::BUSY_TIMEOUT_MS,
        ))?;
        Ok(())
    }

    fn ensure_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS modules (
                id TEXT PRIMARY KEY,
                manifest TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RegistryError::Other(format!("Failed to acquire store lock: {}", e)))
    }
}

#[async_trait]
impl ModuleStore for SqliteStore {
    async fn set(&self, id: &str, manifest: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO modules (id, manifest) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET manifest = excluded.manifest",
            params![id, manifest],
        )?;
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT manifest FROM modules")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut manifests = Vec::new();
        for row in rows {
            manifests.push(row?);
        }
        Ok(manifests)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM modules WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    async fn ping(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }
}
