//! In-memory storage backend (default).
//!
//! Uses DashMap so clones of the same storage share one map.

use super::Storage;
use crate::error::Result;
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory key-value storage.
///
/// Cloning is cheap and every clone sees the same entries, which is how the
/// registry and the lists share one store.
///
/// # Example
///
/// ```
/// use shop_kit::backend::{InMemoryStorage, Storage};
///
/// # fn main() -> shop_kit::Result<()> {
/// let storage = InMemoryStorage::new();
/// storage.set("idCount", "3".to_string())?;
///
/// let shared = storage.clone();
/// assert_eq!(shared.get("idCount")?, Some("3".to_string()));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<DashMap<String, String>>,
}

impl InMemoryStorage {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        InMemoryStorage {
            store: Arc::new(DashMap::new()),
        }
    }

    /// Create a store pre-populated with entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let storage = Self::new();
        for (key, value) in entries {
            storage.store.insert(key.into(), value.into());
        }
        storage
    }

    /// Get the current number of entries.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Get size statistics.
    pub fn stats(&self) -> StorageStats {
        let total_bytes: usize = self
            .store
            .iter()
            .map(|entry| entry.key().len() + entry.value().len())
            .sum();

        StorageStats {
            total_entries: self.store.len(),
            total_bytes,
        }
    }

    /// Print storage statistics to debug log.
    pub fn log_stats(&self) {
        let stats = self.stats();
        debug!(
            "Storage Stats: {} entries, {} bytes",
            stats.total_entries, stats.total_bytes
        );
    }

    /// Remove every entry.
    pub fn clear_all(&self) {
        self.store.clear();
        warn!("InMemory CLEAR_ALL executed - all entries removed");
    }
}

impl Storage for InMemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.store.get(key).map(|entry| entry.value().clone());
        debug!(
            "InMemory GET {} -> {}",
            key,
            if value.is_some() { "HIT" } else { "MISS" }
        );
        Ok(value)
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.store.insert(key.to_string(), value);
        debug!("InMemory SET {}", key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.store.remove(key);
        debug!("InMemory REMOVE {}", key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.store.iter().map(|entry| entry.key().clone()).collect())
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.store.contains_key(key))
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.store.remove(*key);
        }

        debug!("InMemory REMOVE_MANY {} keys", keys.len());
        Ok(())
    }
}

/// Storage statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageStats {
    pub total_entries: usize,
    pub total_bytes: usize,
}
