//! In-memory preference store for tests and previews

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use super::traits::KeyValueStorage;

/// In-memory key-value store
///
/// Clones share the same underlying map. Writes can be made to fail on
/// demand to exercise persistence error paths.
#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    values: Arc<RwLock<BTreeMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put_value` / `delete_value` fail (or succeed again)
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Store text without going through any validation, e.g. a corrupted blob
    pub fn insert_raw(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("Preference store is not writable"));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStorage for InMemoryKeyValueStore {
    async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(values.get(key).cloned())
    }

    async fn put_value(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        self.insert_raw(key, value)
    }

    async fn delete_value(&self, key: &str) -> Result<bool> {
        self.check_writable()?;
        let mut values = self
            .values
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        Ok(values.remove(key).is_some())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let values = self
            .values
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(values.keys().cloned().collect())
    }
}
