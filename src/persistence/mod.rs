//! Key-value persistence for preferences and the high score
//!
//! The browser keeps everything in LocalStorage; native builds and tests use
//! an in-memory map. Values are plain strings; callers own the encoding.

use std::collections::HashMap;

use thiserror::Error;

#[cfg(target_arch = "wasm32")]
mod local_storage;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

/// Storage failures. None of these are fatal to the game.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage rejected key `{key}`: {reason}")]
    Rejected { key: String, reason: String },
    #[error("malformed value under `{key}`: {value:?}")]
    Malformed { key: String, value: String },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// String key-value storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Process-local store (native builds and tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("missing").unwrap(), None);
        store.set("highScore", "1200").unwrap();
        assert_eq!(store.get("highScore").unwrap().as_deref(), Some("1200"));
    }

    #[test]
    fn test_error_messages() {
        let err = StoreError::Malformed {
            key: "highScore".into(),
            value: "abc".into(),
        };
        assert_eq!(err.to_string(), "malformed value under `highScore`: \"abc\"");
    }
}
