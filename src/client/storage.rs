//! # Durable Local Storage
//!
//! A small JSON-file key-value store, the client's analog of the browser's
//! localStorage. It holds the guest identifier, the favorites-migration
//! marker, and (pre-migration) the legacy list of favorited product ids.
//!
//! The whole map is rewritten on every mutation; the values stored here are
//! a handful of short strings, so durability wins over write efficiency.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Key under which the generated guest identifier persists.
pub const GUEST_ID_KEY: &str = "swipeshop_guest_id";

/// Key marking the one-time favorites migration as complete.
pub const MIGRATION_KEY: &str = "swipeshop_favorites_migrated";

/// Legacy key holding locally-kept favorite product ids, consumed and
/// cleared by the migration agent.
pub const LEGACY_FAVORITES_KEY: &str = "swipeshop_favorites";

/// Local storage failure.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable key-value store backed by a JSON file.
///
/// Values are arbitrary JSON; callers pick the concrete type at the access
/// site. An in-memory mode exists for tests and for environments without a
/// writable data directory.
#[derive(Debug)]
pub struct LocalStore {
    path: Option<PathBuf>,
    values: Mutex<HashMap<String, serde_json::Value>>,
}

impl LocalStore {
    /// Open the store at the platform data directory.
    pub fn open_default() -> Result<Self, StorageError> {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::open(base.join("swipeshop").join("client_store.json"))
    }

    /// Open (or create) the store at an explicit path.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let values = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            HashMap::new()
        };
        Ok(Self {
            path: Some(path),
            values: Mutex::new(values),
        })
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: Mutex::new(HashMap::new()),
        }
    }

    /// Read and deserialize a value; `None` when absent or of the wrong
    /// shape.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let values = self.values.lock().unwrap();
        values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.lock().unwrap().contains_key(key)
    }

    /// Store a value and persist the map.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap();
        values.insert(key.to_string(), serde_json::to_value(value)?);
        self.persist(&values)
    }

    /// Remove a key; returns whether it was present.
    pub fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let mut values = self.values.lock().unwrap();
        let removed = values.remove(key).is_some();
        if removed {
            self.persist(&values)?;
        }
        Ok(removed)
    }

    fn persist(&self, values: &HashMap<String, serde_json::Value>) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(values)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}
