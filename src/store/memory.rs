use super::RateStore;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// In-memory store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryRateStore {
    inner: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateStore for MemoryRateStore {
    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        debug!("Store PUT for key: {}", key);
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let value = entries.get(key).cloned();
        if value.is_some() {
            debug!("Store HIT for key: {}", key);
        } else {
            debug!("Store MISS for key: {}", key);
        }
        Ok(value)
    }
}
