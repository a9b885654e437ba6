use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};
use std::{collections::HashMap, fs, path::PathBuf, sync::RwLock};

/// Host-provided persistent key/value storage.
///
/// Values are JSON so a store can hold both the extension switches (booleans)
/// and the serialized layout blob (a string).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// The extension switch. Only an explicit `false` turns it off; a missing
    /// or non-boolean value counts as on.
    fn enabled(&self) -> Result<bool> {
        Ok(self
            .get(crate::config::ENABLED_KEY)?
            .and_then(|value| value.as_bool())
            .unwrap_or(true))
    }
}

/// Extension settings persisted as one pretty-printed JSON object on disk.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<Map<String, Value>>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            Map::new()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    fn persist(&self, data: &Map<String, Value>) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory {}", parent.display())
            })?;
        }
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

impl KeyValueStore for SettingsStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let guard = self
            .data
            .read()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        guard.insert(key.to_string(), value);
        self.persist(&guard)
    }
}

/// Process-local store; nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let guard = self
            .data
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        guard.insert(key.to_string(), value);
        Ok(())
    }
}
