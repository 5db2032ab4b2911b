// src/store/json_file.rs

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::fs;

use super::SnapshotBackend;
use crate::error::StoreError;

/// One `<namespace>.json` file per store inside `dir`.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    /// The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, namespace: &str) -> PathBuf {
        self.dir.join(format!("{}.json", namespace))
    }
}

#[async_trait]
impl SnapshotBackend for JsonFileBackend {
    async fn read(&self, namespace: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(namespace)).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                namespace: namespace.to_string(),
                source,
            }),
        }
    }

    async fn write(&self, namespace: &str, body: &str) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            namespace: namespace.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).await.map_err(io_err)?;
        atomic_write(&self.path_for(namespace), body)
            .await
            .map_err(io_err)
    }
}

/// Writes through a sibling temp file so readers never see a half-written
/// snapshot.
async fn atomic_write(path: &Path, body: &str) -> std::io::Result<()> {
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, body).await?;
    fs::rename(&temp_path, path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path());
        assert_eq!(backend.read("answers").await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_creates_directory_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("nested"));
        backend.write("files", "{}").await.unwrap();

        assert_eq!(backend.read("files").await.unwrap().as_deref(), Some("{}"));
        assert!(!dir.path().join("nested").join("files.json.tmp").exists());
    }
}
