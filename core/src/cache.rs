//! Typed view over a `Storage` backend.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;
use crate::storage::Storage;

#[derive(Clone)]
pub struct TokenCache {
    storage: Arc<dyn Storage>,
}

impl TokenCache {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.storage.get_item(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        self.storage.set_item(key, serde_json::to_string(value)?)
    }

    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.storage.remove_item(key)
    }

    pub fn contains_key(&self, key: &str) -> Result<bool, StoreError> {
        self.storage.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn typed_values_round_trip_through_storage() {
        let storage = MemoryStorage::new();
        let cache = TokenCache::new(Arc::new(storage.clone()));

        cache.set("numbers", &vec![1, 2, 3]).unwrap();
        assert_eq!(storage.get_item("numbers").unwrap().as_deref(), Some("[1,2,3]"));
        assert_eq!(cache.get::<Vec<u32>>("numbers").unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn contains_key_agrees_with_get() {
        let cache = TokenCache::new(Arc::new(MemoryStorage::new()));
        assert!(!cache.contains_key("user").unwrap());
        assert!(cache.get::<String>("user").unwrap().is_none());

        cache.set("user", "alice").unwrap();
        assert!(cache.contains_key("user").unwrap());
        assert!(cache.get::<String>("user").unwrap().is_some());

        cache.remove("user").unwrap();
        cache.remove("user").unwrap();
        assert!(!cache.contains_key("user").unwrap());
    }

    #[test]
    fn mismatched_shape_is_an_error() {
        let cache = TokenCache::new(Arc::new(MemoryStorage::new()));
        cache.set("user", "plain string").unwrap();
        assert!(matches!(cache.get::<Vec<u8>>("user"), Err(StoreError::Json(_))));
    }
}
