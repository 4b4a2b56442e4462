use std::collections::HashMap;
use std::sync::Mutex;

use super::Storage;

/// In-memory storage for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .expect("storage lock poisoned")
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items
            .lock()
            .expect("storage lock poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.items
            .lock()
            .expect("storage lock poisoned")
            .remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.items
            .lock()
            .expect("storage lock poisoned")
            .keys()
            .cloned()
            .collect()
    }
}
