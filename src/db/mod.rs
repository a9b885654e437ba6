//! SQLite-backed key/value store standing in for browser local storage.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::settings::KeyValueStore;

/// One `kv_entries` row per key; values are JSON text.
#[derive(Clone)]
pub struct LocalStore {
    conn: Arc<Mutex<Connection>>,
    db_path: Arc<PathBuf>,
}

impl LocalStore {
    /// Opens (or creates) the store at `db_path`, creating parent directories
    /// and the entries table as needed.
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create local store directory {}", parent.display())
            })?;
        }

        let conn = Connection::open(&db_path).context("failed to open SQLite local store")?;
        if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
            error!("Failed to enable WAL mode: {err}");
        }
        conn.execute_batch(include_str!("schema.sql"))
            .context("failed to create kv_entries table")?;

        info!("Local store opened at {}", db_path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("local store connection lock poisoned"))
    }

    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        self.connection()?
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("failed to read local store entry '{key}'"))
    }

    /// Inserts or replaces `key`, stamping `updated_at`.
    pub fn set_raw(&self, key: &str, value: String) -> Result<()> {
        self.connection()?
            .execute(
                "INSERT INTO kv_entries (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("failed to write local store entry '{key}'"))?;
        Ok(())
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        match self.get_raw(key)? {
            Some(raw) => {
                let value = serde_json::from_str(&raw)
                    .with_context(|| format!("local store entry '{key}' is not valid JSON"))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.set_raw(key, serde_json::to_string(&value)?)
    }
}
