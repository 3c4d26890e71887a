//! Durable local key-value storage for UI state (selected location, unit).
//!
//! The interface mirrors platform storage semantics: `get` returns the value
//! or absent, `set` overwrites. Write failures are logged and swallowed so a
//! read-only disk never breaks the dashboard itself.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// JSON-file-backed store. The whole map is held in memory and rewritten on
/// every `set`; the data involved is two small entries.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    pub fn new(dir: &Path) -> Self {
        let path = dir.join("state.json");
        let entries = fs::read_to_string(&path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default();

        Self { path, entries: Mutex::new(entries) }
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().expect("store lock poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().expect("store lock poisoned");
        entries.insert(key.to_string(), value.to_string());

        let serialized = match serde_json::to_string_pretty(&*entries) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Failed to serialize state store: {e}");
                return;
            }
        };
        drop(entries);

        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!("Failed to create state directory {}: {e}", parent.display());
                return;
            }
        }

        if let Err(e) = fs::write(&self.path, serialized) {
            tracing::warn!("Failed to write state file {}: {e}", self.path.display());
        }
    }
}

/// In-memory store for tests and the mock data source.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().expect("store lock poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_string(), value.to_string());
    }
}
