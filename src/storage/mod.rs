//! storage
//!
//! Persistence boundary for saved sandbox state.
//!
//! # Architecture
//!
//! State is stored through the [`KeyValueStore`] trait, which has two
//! implementations:
//!
//! - [`MemoryStore`]: process-local, nothing survives exit
//! - [`FileStore`]: one JSON file on disk (`state_file` in the config)
//!
//! Storage failures are never fatal. The sandbox coordinator reports them
//! as warnings and starts fresh.

mod file_store;
mod memory_store;
mod traits;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use traits::{KeyValueStore, StoreError};

/// Create the store selected by configuration: a file store when a state
/// file is configured, memory otherwise.
pub fn create_store(state_file: Option<&std::path::Path>) -> Box<dyn KeyValueStore> {
    match state_file {
        Some(path) => Box::new(FileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_store_without_path() {
        let store = create_store(None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn file_store_with_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");
        let store = create_store(Some(&path));
        store.set("k", "v").unwrap();
        assert!(path.exists());
    }
}
