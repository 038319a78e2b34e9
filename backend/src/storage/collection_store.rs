//! # Collection Store
//!
//! A `CollectionStore<T>` keeps one named, JSON-serializable value in memory
//! and mirrors it into a [`KeyValueStorage`] provider under a fixed key.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized --load()--> Loading --provider answers--> Ready
//! ```
//!
//! `get()` works in every state and returns the caller-supplied default
//! until a stored value has been loaded. A stored value that fails to parse
//! (or a provider that fails to answer) never escapes as an error: the store
//! logs a warning and keeps the default.
//!
//! ## Writes
//!
//! With [`WriteMode::Optimistic`] (the default) `set` updates the in-memory
//! value first and then writes it through. A failed write is logged and
//! reported to the caller but the in-memory value stays, since it is what
//! the user is looking at for the rest of the session.
//! [`WriteMode::Acknowledged`] writes first and only publishes the new value
//! once the provider has accepted it.
//!
//! Overlapping writes are serialized through a write gate, so they apply in
//! call order and the provider always ends up holding the newest value.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::traits::KeyValueStorage;

/// Key of the receipt collection in the preference store
pub const RECEIPTS_KEY: &str = "receipts";
/// Key of the category collection in the preference store
pub const CATEGORIES_KEY: &str = "categories";

/// Ordering between the in-memory update and the provider write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Update memory, then write; failed writes keep the new value
    #[default]
    Optimistic,
    /// Write, then update memory; failed writes keep the old value
    Acknowledged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Uninitialized,
    Loading,
    Ready,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to serialize '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to save '{key}' to storage: {source}")]
    Persist {
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

struct StoreInner<T> {
    value: T,
    state: StoreState,
    /// A write landed while the load was in flight
    written_during_load: bool,
}

/// Persistent, in-memory mirrored value stored under one key
pub struct CollectionStore<T> {
    key: String,
    write_mode: WriteMode,
    provider: Arc<dyn KeyValueStorage>,
    inner: Arc<RwLock<StoreInner<T>>>,
    /// Held across every provider write
    write_gate: Arc<Mutex<()>>,
}

impl<T> Clone for CollectionStore<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            write_mode: self.write_mode,
            provider: self.provider.clone(),
            inner: self.inner.clone(),
            write_gate: self.write_gate.clone(),
        }
    }
}

impl<T> CollectionStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Create a store for `key`. Nothing is read until [`load`](Self::load).
    pub fn new(key: &str, default: T, provider: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            key: key.to_string(),
            write_mode: WriteMode::default(),
            provider,
            inner: Arc::new(RwLock::new(StoreInner {
                value: default,
                state: StoreState::Uninitialized,
                written_during_load: false,
            })),
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    pub fn state(&self) -> StoreState {
        self.read().state
    }

    pub fn is_loading(&self) -> bool {
        self.state() == StoreState::Loading
    }

    /// Current in-memory value
    pub fn get(&self) -> T {
        self.read().value.clone()
    }

    /// Run `f` against the current value without cloning it
    pub fn with_value<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.read().value)
    }

    /// Read the stored value from the provider. Only the first call reaches
    /// the provider; later calls return the current value.
    pub async fn load(&self) -> T {
        {
            let mut inner = self.write();
            if inner.state != StoreState::Uninitialized {
                debug!("'{}' already loaded, skipping provider read", self.key);
                return inner.value.clone();
            }
            inner.state = StoreState::Loading;
            inner.written_during_load = false;
        }

        let loaded = match self.provider.get_value(&self.key).await {
            Ok(Some(text)) => match serde_json::from_str::<T>(&text) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Stored value for '{}' is malformed, using default: {}", self.key, e);
                    None
                }
            },
            Ok(None) => {
                debug!("No stored value for '{}', using default", self.key);
                None
            }
            Err(e) => {
                warn!("Error loading '{}' from storage, using default: {}", self.key, e);
                None
            }
        };

        let mut inner = self.write();
        if let Some(value) = loaded {
            if inner.written_during_load {
                warn!("'{}' changed while loading, keeping the newer in-memory value", self.key);
            } else {
                inner.value = value;
            }
        }
        inner.state = StoreState::Ready;
        info!("Loaded '{}'", self.key);
        inner.value.clone()
    }

    /// Replace the value and write it through to the provider
    pub async fn set(&self, value: T) -> Result<(), StoreError> {
        self.update(move |_| value).await
    }

    /// Replace the value with `updater(current)` and write it through
    pub async fn update<F>(&self, updater: F) -> Result<(), StoreError>
    where
        F: FnOnce(&T) -> T,
    {
        match self.write_mode {
            WriteMode::Optimistic => {
                {
                    let mut inner = self.write();
                    let next = updater(&inner.value);
                    Self::publish(&mut inner, next);
                }

                // A later update may already have replaced our value
                let _gate = self.write_gate.lock().await;
                let latest = self.get();
                self.persist(&latest).await
            }
            WriteMode::Acknowledged => {
                let _gate = self.write_gate.lock().await;
                let next = self.with_value(updater);
                self.persist(&next).await?;
                let mut inner = self.write();
                Self::publish(&mut inner, next);
                Ok(())
            }
        }
    }

    fn publish(inner: &mut StoreInner<T>, value: T) {
        if inner.state == StoreState::Loading {
            inner.written_during_load = true;
        }
        inner.value = value;
    }

    async fn persist(&self, value: &T) -> Result<(), StoreError> {
        let text = serde_json::to_string(value).map_err(|source| {
            error!("Error serializing '{}': {}", self.key, source);
            StoreError::Serialize {
                key: self.key.clone(),
                source,
            }
        })?;

        self.provider
            .put_value(&self.key, &text)
            .await
            .map_err(|source| {
                error!("Error saving '{}' to storage: {}", self.key, source);
                StoreError::Persist {
                    key: self.key.clone(),
                    source,
                }
            })
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreInner<T>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner<T>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::InMemoryKeyValueStore;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: String,
        tags: Vec<String>,
    }

    fn items() -> Vec<Item> {
        vec![
            Item { id: "a".to_string(), tags: vec!["x".to_string()] },
            Item { id: "b".to_string(), tags: vec![] },
        ]
    }

    fn store_with(provider: &InMemoryKeyValueStore, default: Vec<Item>) -> CollectionStore<Vec<Item>> {
        CollectionStore::new("items", default, Arc::new(provider.clone()))
    }

    /// Provider whose reads always fail
    struct UnreadableStore;

    #[async_trait]
    impl KeyValueStorage for UnreadableStore {
        async fn get_value(&self, _key: &str) -> Result<Option<String>> {
            Err(anyhow!("disk on fire"))
        }
        async fn put_value(&self, _key: &str, _value: &str) -> Result<()> {
            Ok(())
        }
        async fn delete_value(&self, _key: &str) -> Result<bool> {
            Ok(false)
        }
        async fn list_keys(&self) -> Result<Vec<String>> {
            Ok(vec![])
        }
    }

    /// Provider whose reads block until released and whose writes go nowhere
    struct GatedStore {
        inner: InMemoryKeyValueStore,
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl KeyValueStorage for GatedStore {
        async fn get_value(&self, key: &str) -> Result<Option<String>> {
            self.gate.notified().await;
            self.inner.get_value(key).await
        }
        async fn put_value(&self, _key: &str, _value: &str) -> Result<()> {
            Ok(())
        }
        async fn delete_value(&self, _key: &str) -> Result<bool> {
            Ok(false)
        }
        async fn list_keys(&self) -> Result<Vec<String>> {
            self.inner.list_keys().await
        }
    }

    /// Provider whose writes yield to the scheduler before landing
    struct SlowWriteStore {
        inner: InMemoryKeyValueStore,
    }

    #[async_trait]
    impl KeyValueStorage for SlowWriteStore {
        async fn get_value(&self, key: &str) -> Result<Option<String>> {
            self.inner.get_value(key).await
        }
        async fn put_value(&self, key: &str, value: &str) -> Result<()> {
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
            self.inner.put_value(key, value).await
        }
        async fn delete_value(&self, key: &str) -> Result<bool> {
            self.inner.delete_value(key).await
        }
        async fn list_keys(&self) -> Result<Vec<String>> {
            self.inner.list_keys().await
        }
    }

    fn slow_store(backing: &InMemoryKeyValueStore, write_mode: WriteMode) -> CollectionStore<Vec<u32>> {
        let provider = SlowWriteStore { inner: backing.clone() };
        CollectionStore::new("numbers", Vec::new(), Arc::new(provider)).with_write_mode(write_mode)
    }

    fn push(value: u32) -> impl FnOnce(&Vec<u32>) -> Vec<u32> {
        move |current| {
            let mut next = current.clone();
            next.push(value);
            next
        }
    }

    async fn stored_numbers(backing: &InMemoryKeyValueStore) -> Vec<u32> {
        let text = backing.get_value("numbers").await.unwrap().unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[tokio::test]
    async fn test_get_before_load_returns_default() {
        let provider = InMemoryKeyValueStore::new();
        let store = store_with(&provider, items());

        assert_eq!(store.state(), StoreState::Uninitialized);
        assert_eq!(store.get(), items());
    }

    #[tokio::test]
    async fn test_load_absent_keeps_default_without_writing() {
        let provider = InMemoryKeyValueStore::new();
        let store = store_with(&provider, items());

        let loaded = store.load().await;

        assert_eq!(loaded, items());
        assert_eq!(store.state(), StoreState::Ready);
        assert!(provider.list_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_then_reload_round_trips() {
        let provider = InMemoryKeyValueStore::new();
        let store = store_with(&provider, vec![]);
        store.load().await;

        store.set(items()).await.expect("Failed to set value");

        let reloaded = store_with(&provider, vec![]);
        assert_eq!(reloaded.load().await, items());
    }

    #[tokio::test]
    async fn test_malformed_value_falls_back_to_default() {
        let provider = InMemoryKeyValueStore::new();
        provider.insert_raw("items", "{not json").unwrap();
        let store = store_with(&provider, items());

        let loaded = store.load().await;

        assert_eq!(loaded, items());
        assert_eq!(store.get(), items());
        assert_eq!(store.state(), StoreState::Ready);
    }

    #[tokio::test]
    async fn test_wrong_shape_falls_back_to_default() {
        let provider = InMemoryKeyValueStore::new();
        provider.insert_raw("items", r#"{"id": "a"}"#).unwrap();
        let store = store_with(&provider, vec![]);

        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_read_failure_falls_back_to_default() {
        let store = CollectionStore::new("items", items(), Arc::new(UnreadableStore));

        assert_eq!(store.load().await, items());
        assert_eq!(store.state(), StoreState::Ready);
    }

    #[tokio::test]
    async fn test_second_load_does_not_reread() {
        let provider = InMemoryKeyValueStore::new();
        let store = store_with(&provider, vec![]);
        store.load().await;

        provider
            .insert_raw("items", &serde_json::to_string(&items()).unwrap())
            .unwrap();

        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_applies_to_current_value() {
        let provider = InMemoryKeyValueStore::new();
        let store = store_with(&provider, items());
        store.load().await;

        store
            .update(|current| {
                let mut next = vec![Item { id: "c".to_string(), tags: vec![] }];
                next.extend(current.iter().cloned());
                next
            })
            .await
            .unwrap();

        let ids: Vec<String> = store.get().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);

        let stored = provider.get_value("items").await.unwrap().unwrap();
        let stored: Vec<Item> = serde_json::from_str(&stored).unwrap();
        assert_eq!(stored, store.get());
    }

    #[tokio::test]
    async fn test_optimistic_write_failure_keeps_new_value() {
        let provider = InMemoryKeyValueStore::new();
        let store = store_with(&provider, vec![]);
        store.load().await;
        provider.fail_writes(true);

        let result = store.set(items()).await;

        assert!(matches!(result, Err(StoreError::Persist { .. })));
        assert_eq!(store.get(), items());
        assert!(provider.get_value("items").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_acknowledged_write_failure_keeps_old_value() {
        let provider = InMemoryKeyValueStore::new();
        let store = store_with(&provider, vec![]).with_write_mode(WriteMode::Acknowledged);
        store.load().await;
        provider.fail_writes(true);

        assert!(store.set(items()).await.is_err());
        assert!(store.get().is_empty());

        provider.fail_writes(false);
        store.set(items()).await.unwrap();
        assert_eq!(store.get(), items());
    }

    #[tokio::test]
    async fn test_write_during_load_wins_over_stored_value() {
        let backing = InMemoryKeyValueStore::new();
        backing
            .insert_raw("items", &serde_json::to_string(&items()).unwrap())
            .unwrap();
        let gate = Arc::new(Notify::new());
        let provider = GatedStore { inner: backing, gate: gate.clone() };
        let store: CollectionStore<Vec<Item>> = CollectionStore::new("items", vec![], Arc::new(provider));

        let loader = {
            let store = store.clone();
            tokio::spawn(async move { store.load().await })
        };
        while store.state() != StoreState::Loading {
            tokio::task::yield_now().await;
        }
        assert!(store.is_loading());

        let fresh = vec![Item { id: "fresh".to_string(), tags: vec![] }];
        store.set(fresh.clone()).await.unwrap();
        gate.notify_one();

        let loaded = loader.await.unwrap();
        assert_eq!(loaded, fresh);
        assert_eq!(store.get(), fresh);
        assert_eq!(store.state(), StoreState::Ready);
    }

    #[tokio::test]
    async fn test_overlapping_acknowledged_updates_keep_both() {
        let backing = InMemoryKeyValueStore::new();
        let store = slow_store(&backing, WriteMode::Acknowledged);
        store.load().await;

        let (first, second) = tokio::join!(store.update(push(1)), store.update(push(2)));

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(store.get(), vec![1, 2]);
        assert_eq!(stored_numbers(&backing).await, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_overlapping_optimistic_updates_persist_newest() {
        let backing = InMemoryKeyValueStore::new();
        let store = slow_store(&backing, WriteMode::Optimistic);
        store.load().await;

        let (first, second) = tokio::join!(store.update(push(1)), store.update(push(2)));

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(store.get(), vec![1, 2]);
        assert_eq!(stored_numbers(&backing).await, vec![1, 2]);
    }
}
