//! storage::traits
//!
//! Key-value storage trait definition.
//!
//! # Design
//!
//! The `KeyValueStore` trait mirrors the browser storage interface the
//! sandbox was built against: string keys, string values, three methods.
//! Callers treat every error as "nothing saved" and carry on.
//!
//! # Example
//!
//! ```
//! use gitsketch::storage::{KeyValueStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.set("git-viz-snapshot", "{}").unwrap();
//! assert_eq!(store.get("git-viz-snapshot").unwrap().as_deref(), Some("{}"));
//!
//! store.remove("git-viz-snapshot").unwrap();
//! assert!(store.get("git-viz-snapshot").unwrap().is_none());
//! ```

use thiserror::Error;

/// Errors from storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read from storage.
    #[error("failed to read saved state: {0}")]
    ReadError(String),

    /// Failed to write to storage.
    #[error("failed to write saved state: {0}")]
    WriteError(String),

    /// Failed to remove from storage.
    #[error("failed to remove saved state: {0}")]
    RemoveError(String),

    /// Storage is not usable in this environment.
    #[error("storage not available: {0}")]
    Unavailable(String),
}

/// Trait for persistent key-value storage.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Set a value, overwriting any existing one.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a value.
    ///
    /// Returns `Ok(())` even if the key did not exist.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = StoreError::ReadError("disk full".into());
        assert!(err.to_string().contains("read"));

        let err = StoreError::WriteError("permission denied".into());
        assert!(err.to_string().contains("write"));

        let err = StoreError::RemoveError("io error".into());
        assert!(err.to_string().contains("remove"));

        let err = StoreError::Unavailable("private mode".into());
        assert!(err.to_string().contains("not available"));
    }
}
