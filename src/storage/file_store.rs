//! storage::file_store
//!
//! File-backed key-value storage.
//!
//! # Format
//!
//! The file holds one JSON object mapping keys to string values. A missing
//! file is an empty store.
//!
//! # Writes
//!
//! All writes are atomic (write to a temp file, then rename).
//!
//! # Example
//!
//! ```no_run
//! use gitsketch::storage::{FileStore, KeyValueStore};
//!
//! let store = FileStore::new("/tmp/gitsketch-state.json");
//! store.set("git-viz-snapshot", "{}").unwrap();
//! ```

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::traits::{KeyValueStore, StoreError};

/// Key-value storage in a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Path to the state file
    path: PathBuf,
}

impl FileStore {
    /// Create a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location, `<data dir>/gitsketch/state.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory can be determined.
    pub fn default_location() -> Result<Self, StoreError> {
        let dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StoreError::Unavailable("cannot determine data directory".into()))?;
        Ok(Self::new(dir.join("gitsketch").join("state.json")))
    }

    /// Get the path to the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::ReadError(format!("cannot read state file: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| StoreError::ReadError(format!("cannot parse state file: {}", e)))
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::WriteError(format!("cannot create directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| StoreError::WriteError(format!("cannot serialize state: {}", e)))?;

        let temp_path = self.path.with_extension("tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| StoreError::WriteError(format!("cannot create temp file: {}", e)))?;

            file.write_all(content.as_bytes())
                .map_err(|e| StoreError::WriteError(format!("cannot write state: {}", e)))?;

            file.sync_all()
                .map_err(|e| StoreError::WriteError(format!("cannot sync to disk: {}", e)))?;
        }

        fs::rename(&temp_path, &self.path)
            .map_err(|e| StoreError::WriteError(format!("cannot rename temp file: {}", e)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_all(&entries)
            .map_err(|e| StoreError::RemoveError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileStore) {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path().join("nested").join("state.json"));
        (temp, store)
    }

    #[test]
    fn missing_file_is_empty() {
        let (_temp, store) = store();
        assert!(store.get("key").unwrap().is_none());
        assert!(!store.exists("key").unwrap());
    }

    #[test]
    fn set_get_remove() {
        let (_temp, store) = store();
        store.set("key", "value").unwrap();
        assert_eq!(store.get("key").unwrap().as_deref(), Some("value"));
        assert!(store.path().exists());

        store.set("key", "other").unwrap();
        assert_eq!(store.get("key").unwrap().as_deref(), Some("other"));

        store.remove("key").unwrap();
        assert!(store.get("key").unwrap().is_none());
    }

    #[test]
    fn remove_missing_is_ok() {
        let (_temp, store) = store();
        store.remove("absent").unwrap();
    }

    #[test]
    fn keys_are_independent() {
        let (_temp, store) = store();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.remove("a").unwrap();
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn persists_across_instances() {
        let (_temp, store) = store();
        store.set("key", "value").unwrap();
        let again = FileStore::new(store.path());
        assert_eq!(again.get("key").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn corrupt_file_is_a_read_error() {
        let (_temp, store) = store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.get("key"), Err(StoreError::ReadError(_))));
    }
}
