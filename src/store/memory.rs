use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::store::repo::KeyValueStore;

/// In-process store. Clones share the same map, so a test can keep a handle
/// to a store it handed to a session.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.map.lock().map_err(|_| anyhow!("memory store poisoned"))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.map.lock().map_err(|_| anyhow!("memory store poisoned"))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.map.lock().map_err(|_| anyhow!("memory store poisoned"))?;
        map.remove(key);
        Ok(())
    }
}
