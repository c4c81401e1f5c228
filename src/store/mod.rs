//! Backup storage for the last successfully fetched rates and currency list.

pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use disk::DiskRateStore;
use memory::MemoryRateStore;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::{debug, warn};

pub const RATES_KEY: &str = "rates";
pub const CURRENCIES_KEY: &str = "currencies";

/// A byte-oriented key-value store for backups.
pub trait RateStore: Send + Sync {
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
}

/// Serializes `value` as JSON under `key`.
pub fn save<T: Serialize>(store: &dyn RateStore, key: &str, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec(value)
        .with_context(|| format!("Failed to serialize backup: {key}"))?;
    store.put(key, &bytes)?;
    debug!(key, bytes = bytes.len(), "Saved backup");
    Ok(())
}

/// Reads the JSON value under `key`, if any.
pub fn load<T: DeserializeOwned>(store: &dyn RateStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(bytes) => {
            let value = serde_json::from_slice(&bytes)
                .with_context(|| format!("Failed to parse backup: {key}"))?;
            debug!(key, "Loaded backup");
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Opens the on-disk store under the data directory, or an in-memory one if that fails.
pub fn open_default(config: &AppConfig) -> Arc<dyn RateStore> {
    let opened = config
        .default_data_path()
        .and_then(|path| DiskRateStore::open(&path.join("backup")));

    match opened {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("Could not open backup store: {e:#}. Backups will not persist");
            Arc::new(MemoryRateStore::new())
        }
    }
}
