//! Key-value storage seam.
//!
//! Everything the app persists (profile, daily completions, reflections,
//! pending reminders) goes through [`KeyValueStore`]. Components receive a
//! store explicitly; there is no global instance.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::StorageError;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    fn set(&self, key: &str, value: &Value) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Keys starting with `prefix`, sorted.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Read and decode a typed value.
    ///
    /// A value that no longer decodes (older format, manual edit) is logged
    /// and treated as absent.
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError>
    where
        Self: Sized,
    {
        let Some(value) = self.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(decoded) => Ok(Some(decoded)),
            Err(e) => {
                tracing::warn!(key, "discarding undecodable stored value: {e}");
                Ok(None)
            }
        }
    }

    /// Encode and write a typed value.
    fn store<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError>
    where
        Self: Sized,
    {
        let value = serde_json::to_value(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.set(key, &value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        (**self).keys_with_prefix(prefix)
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_store_get_set_remove() {
        let store = MemoryStore::new();
        assert!(store.get("a").unwrap().is_none());
        store.set("a", &json!({"n": 1})).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(json!({"n": 1})));
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn prefix_listing_is_sorted() {
        let store = MemoryStore::new();
        store.set("day_2025-12-04", &json!(1)).unwrap();
        store.set("other", &json!(2)).unwrap();
        store.set("day_2025-12-03", &json!(3)).unwrap();
        assert_eq!(
            store.keys_with_prefix("day_").unwrap(),
            vec!["day_2025-12-03", "day_2025-12-04"]
        );
    }

    #[test]
    fn undecodable_value_loads_as_absent() {
        let store = MemoryStore::new();
        store.set("count", &json!("not a number")).unwrap();
        let loaded: Option<u32> = store.load("count").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn typed_round_trip_through_reference() {
        let store = MemoryStore::new();
        let by_ref = &store;
        by_ref.store("list", &vec!["a", "b"]).unwrap();
        let loaded: Option<Vec<String>> = by_ref.load("list").unwrap();
        assert_eq!(loaded.unwrap(), vec!["a", "b"]);
    }
}
