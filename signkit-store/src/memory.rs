//! In-memory key-value store.
//!
//! Nothing survives the process. Useful for tests and for callers that
//! persist the records themselves.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{KeyValueStore, StorageError, StorageResult};

/// Thread-safe in-memory store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, String>>,
    closed: AtomicBool,
}

impl MemoryStore {
    /// Creates a new empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed.
    pub fn len(&self) -> StorageResult<usize> {
        Ok(self.read()?.len())
    }

    /// Returns `true` if no records are stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed.
    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Returns all keys, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed.
    pub fn keys(&self) -> StorageResult<Vec<String>> {
        let mut keys: Vec<String> = self.read()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StorageError::Closed);
        }
        Ok(())
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, HashMap<String, String>>> {
        self.ensure_open()?;
        self.records
            .read()
            .map_err(|_| StorageError::Backend("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, HashMap<String, String>>> {
        self.ensure_open()?;
        self.records
            .write()
            .map_err(|_| StorageError::Backend("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        self.write()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.write()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        self.write()?.clear();
        Ok(())
    }

    fn close(&self) -> StorageResult<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn replace_all(&self, records: &[(&str, &str)]) -> StorageResult<()> {
        let mut guard = self.write()?;
        guard.clear();
        guard.extend(
            records
                .iter()
                .map(|(key, value)| ((*key).to_string(), (*value).to_string())),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_delete() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").expect("get"), None);

        store.put("a", "1").expect("put");
        assert_eq!(store.get("a").expect("get").as_deref(), Some("1"));

        store.put("a", "2").expect("overwrite");
        assert_eq!(store.get("a").expect("get").as_deref(), Some("2"));

        store.delete("a").expect("delete");
        store.delete("a").expect("delete missing");
        assert!(store.is_empty().expect("is_empty"));
    }

    #[test]
    fn test_replace_all_drops_unrelated_keys() {
        let store = MemoryStore::new();
        store.put("unrelated", "x").expect("put");

        store
            .replace_all(&[("one", "1"), ("two", "2")])
            .expect("replace");

        assert_eq!(store.keys().expect("keys"), vec!["one", "two"]);
        assert_eq!(store.get("unrelated").expect("get"), None);
    }

    #[test]
    fn test_closed_store_rejects_calls() {
        let store = MemoryStore::new();
        store.put("a", "1").expect("put");
        store.close().expect("close");

        assert!(matches!(store.get("a"), Err(StorageError::Closed)));
        assert!(matches!(store.put("b", "2"), Err(StorageError::Closed)));
        assert!(matches!(store.clear(), Err(StorageError::Closed)));
    }
}
