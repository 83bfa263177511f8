//! In-memory key-value store shared by all plugins

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// String-to-string store. Not persisted.
#[derive(Default)]
pub struct Storage {
    data: RwLock<HashMap<String, String>>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Insert or replace. Always succeeds.
    pub fn set(&self, key: &str, value: &str) -> bool {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        true
    }

    pub fn has(&self, key: &str) -> bool {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Remove `key`. Returns whether it existed.
    pub fn remove(&self, key: &str) -> bool {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.data.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = Storage::new();
        assert!(storage.is_empty());
        assert!(storage.set("k", "v1"));
        assert!(storage.set("k", "v2"));
        assert_eq!(storage.get("k").as_deref(), Some("v2"));
        assert_eq!(storage.len(), 1);
        assert!(storage.remove("k"));
        assert!(!storage.remove("k"));
        assert!(!storage.has("k"));
    }
}
