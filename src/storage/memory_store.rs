//! storage::memory_store
//!
//! In-memory key-value storage, used when no state file is configured.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::traits::{KeyValueStore, StoreError};

/// Key-value storage that lives as long as the value does.
///
/// Clones share their entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let store = MemoryStore::new();
        assert!(store.get("k").unwrap().is_none());
        store.set("k", "v").unwrap();
        assert!(store.exists("k").unwrap());
        store.remove("k").unwrap();
        assert!(!store.exists("k").unwrap());
    }

    #[test]
    fn clones_share_entries() {
        let store = MemoryStore::new();
        let view = store.clone();
        store.set("k", "v").unwrap();
        assert_eq!(view.get("k").unwrap().as_deref(), Some("v"));
    }
}
