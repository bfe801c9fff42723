//! Storage backend implementations.

use crate::error::Result;

pub mod inmemory;

pub use inmemory::InMemoryStorage;

/// Trait for key-value storage implementations.
///
/// Abstracts the durable store that products, list indexes and the id counter
/// are written through to. Keys and values are plain strings.
///
/// **IMPORTANT:** All methods use `&self` instead of `&mut self` so the same
/// store can be shared by the registry and every list. Implementations should
/// use interior mutability or external storage.
///
/// Writes are synchronous: when a method returns `Ok`, the value is stored.
pub trait Storage: Send + Sync + Clone {
    /// Retrieve a value by key.
    ///
    /// # Returns
    /// - `Ok(Some(value))` - Key present
    /// - `Ok(None)` - Key absent
    ///
    /// # Errors
    /// Returns `Err` if the backend cannot be read
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, replacing any previous one.
    ///
    /// # Errors
    /// Returns `Err` if the backend cannot be written
    fn set(&self, key: &str, value: String) -> Result<()>;

    /// Remove a value. Removing an absent key is not an error.
    ///
    /// # Errors
    /// Returns `Err` if the backend cannot be written
    fn remove(&self, key: &str) -> Result<()>;

    /// Enumerate every key currently stored.
    ///
    /// Order is unspecified.
    ///
    /// # Errors
    /// Returns `Err` if the backend cannot be enumerated
    fn keys(&self) -> Result<Vec<String>>;

    /// Check if a key exists (optional optimization).
    ///
    /// # Errors
    /// Returns `Err` if the backend cannot be read
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Bulk remove operation (optional optimization).
    ///
    /// Default implementation calls `remove()` for each key.
    ///
    /// # Errors
    /// Returns `Err` if the backend cannot be written
    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_contains_default() {
        let storage = InMemoryStorage::new();
        storage
            .set("key", "value".to_string())
            .expect("Failed to set key");
        assert!(storage.contains("key").expect("Failed to check contains"));
        assert!(!storage
            .contains("nonexistent")
            .expect("Failed to check contains"));
    }
}
