//! Persisted best score
//!
//! Stored as a plain decimal string. Both operations are idempotent: reading
//! never writes, and recording the same score twice writes at most once.

use crate::persistence::{KeyValueStore, StoreError};

/// The single best score across sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighScore {
    best: u64,
}

impl HighScore {
    /// Storage key
    const STORAGE_KEY: &'static str = "highScore";

    pub fn best(&self) -> u64 {
        self.best
    }

    /// Current stored high score (0 when none was saved)
    pub fn read(store: &impl KeyValueStore) -> Result<u64, StoreError> {
        let Some(raw) = store.get(Self::STORAGE_KEY)? else {
            return Ok(0);
        };
        raw.trim().parse::<u64>().map_err(|_| StoreError::Malformed {
            key: Self::STORAGE_KEY.to_string(),
            value: raw,
        })
    }

    /// Stored high score, or 0 when missing or unreadable
    pub fn load(store: &impl KeyValueStore) -> Self {
        match Self::read(store) {
            Ok(best) => {
                log::info!("Loaded high score {}", best);
                Self { best }
            }
            Err(e) => {
                log::warn!("Ignoring stored high score: {}", e);
                Self::default()
            }
        }
    }

    /// Write `score` if it beats the best. Returns whether it did.
    pub fn record_if_higher(&mut self, store: &mut impl KeyValueStore, score: u64) -> Result<bool, StoreError> {
        if score <= self.best {
            return Ok(false);
        }
        store.set(Self::STORAGE_KEY, &score.to_string())?;
        self.best = score;
        log::info!("New high score {}", score);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_read_missing_is_zero() {
        let store = MemoryStore::new();
        assert_eq!(HighScore::read(&store).unwrap(), 0);
    }

    #[test]
    fn test_record_only_when_higher() {
        let mut store = MemoryStore::new();
        let mut high = HighScore::load(&store);
        assert!(high.record_if_higher(&mut store, 300).unwrap());
        assert!(!high.record_if_higher(&mut store, 300).unwrap());
        assert!(!high.record_if_higher(&mut store, 200).unwrap());
        assert_eq!(HighScore::read(&store).unwrap(), 300);
        assert_eq!(high.best(), 300);
    }

    #[test]
    fn test_malformed_value() {
        let mut store = MemoryStore::new();
        store.set("highScore", "lots").unwrap();
        assert!(matches!(HighScore::read(&store), Err(StoreError::Malformed { .. })));
        assert_eq!(HighScore::load(&store).best(), 0);
    }

    #[test]
    fn test_reads_legacy_whitespace() {
        let mut store = MemoryStore::new();
        store.set("highScore", " 1250\n").unwrap();
        assert_eq!(HighScore::load(&store).best(), 1250);
    }
}
