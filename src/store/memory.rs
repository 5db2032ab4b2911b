// src/store/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::SnapshotBackend;
use crate::error::StoreError;

/// Keeps snapshots in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    snapshots: RwLock<HashMap<String, String>>,
}

#[async_trait]
impl SnapshotBackend for MemoryBackend {
    async fn read(&self, namespace: &str) -> Result<Option<String>, StoreError> {
        Ok(self.snapshots.read().await.get(namespace).cloned())
    }

    async fn write(&self, namespace: &str, body: &str) -> Result<(), StoreError> {
        self.snapshots
            .write()
            .await
            .insert(namespace.to_string(), body.to_string());
        Ok(())
    }
}
