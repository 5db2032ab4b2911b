// src/store/mod.rs

//! Keyed snapshot persistence.
//!
//! Every store keeps its whole mapping in one snapshot: `load` reads all of
//! it, `save` overwrites all of it. Read-modify-write goes through
//! [`KeyedStore::update`], which serializes concurrent writers of the same
//! store behind a mutex.

use std::{collections::BTreeMap, marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;

use crate::error::StoreError;

pub mod json_file;
pub mod memory;
pub mod sqlite;

pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

/// Raw snapshot storage: one text document per namespace.
#[async_trait]
pub trait SnapshotBackend: Send + Sync {
    /// Returns `None` when nothing was ever saved under `namespace`.
    async fn read(&self, namespace: &str) -> Result<Option<String>, StoreError>;

    /// Replaces the snapshot for `namespace`.
    async fn write(&self, namespace: &str, body: &str) -> Result<(), StoreError>;
}

/// Typed mapping persisted as one pretty-printed JSON object.
pub struct KeyedStore<K, V> {
    backend: Arc<dyn SnapshotBackend>,
    namespace: &'static str,
    lock: Mutex<()>,
    _entries: PhantomData<fn() -> (K, V)>,
}

impl<K, V> KeyedStore<K, V>
where
    K: Ord + Serialize + DeserializeOwned,
    V: Serialize + DeserializeOwned,
{
    pub fn new(backend: Arc<dyn SnapshotBackend>, namespace: &'static str) -> Self {
        Self {
            backend,
            namespace,
            lock: Mutex::new(()),
            _entries: PhantomData,
        }
    }

    /// Loads the full mapping, empty if nothing has been persisted yet.
    pub async fn load(&self) -> Result<BTreeMap<K, V>, StoreError> {
        match self.backend.read(self.namespace).await? {
            Some(body) => serde_json::from_str(&body).map_err(|source| StoreError::Serialization {
                namespace: self.namespace.to_string(),
                source,
            }),
            None => Ok(BTreeMap::new()),
        }
    }

    /// Overwrites the persisted snapshot with `entries`.
    ///
    /// Callers racing with [`KeyedStore::update`] may lose writes; prefer
    /// `update` for anything that depends on the current contents.
    pub async fn save(&self, entries: &BTreeMap<K, V>) -> Result<(), StoreError> {
        let body =
            serde_json::to_string_pretty(entries).map_err(|source| StoreError::Serialization {
                namespace: self.namespace.to_string(),
                source,
            })?;
        self.backend.write(self.namespace, &body).await
    }

    /// Runs `load -> mutate -> save` while holding this store's lock.
    pub async fn update<F, R>(&self, mutate: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut BTreeMap<K, V>) -> R,
    {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        let out = mutate(&mut entries);
        self.save(&entries).await?;
        Ok(out)
    }

    pub async fn get(&self, key: &K) -> Result<Option<V>, StoreError> {
        Ok(self.load().await?.remove(key))
    }
}
