//! Key/value document storage

use crate::error::StorageError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Abstract storage provider trait.
/// Each key holds one independently written document.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Read the document stored under `key`, `None` when absent
    async fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Write (replace) the document stored under `key`
    async fn write(&self, key: &str, data: Vec<u8>) -> StorageResult<()>;
}

/// Local filesystem storage provider: one file per key under a root directory
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Create a new local storage provider with the given root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to a file, rejecting keys that would escape the root
    fn full_path(&self, key: &str) -> StorageResult<PathBuf> {
        let mut normalized = PathBuf::new();
        for component in Path::new(key).components() {
            match component {
                Component::Normal(c) => normalized.push(c),
                Component::CurDir => {}
                Component::ParentDir | Component::Prefix(_) | Component::RootDir => {
                    return Err(StorageError::BackendError(format!(
                        "key `{key}` escapes the storage root"
                    )));
                }
            }
        }
        if normalized.as_os_str().is_empty() {
            return Err(StorageError::BackendError("empty storage key".to_string()));
        }
        Ok(self.root.join(normalized))
    }
}

#[async_trait]
impl StorageProvider for LocalStorage {
    async fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let full_path = self.full_path(key)?;
        match tokio::fs::read(full_path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    /// Writes to a temp file, then renames it into place
    async fn write(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        let full_path = self.full_path(key)?;
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::BackendError(e.to_string()))?;
        }
        let mut temp_path = full_path.clone().into_os_string();
        temp_path.push(".tmp");
        tokio::fs::write(&temp_path, data)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;
        tokio::fs::rename(&temp_path, &full_path)
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))
    }
}

/// In-memory storage provider (for testing)
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, Vec<u8>>>,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail, to exercise best-effort saving
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    fn lock_error() -> StorageError {
        StorageError::BackendError("memory store lock poisoned".to_string())
    }
}

#[async_trait]
impl StorageProvider for MemoryStorage {
    async fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let data = self.data.read().map_err(|_| Self::lock_error())?;
        Ok(data.get(key).cloned())
    }

    async fn write(&self, key: &str, data: Vec<u8>) -> StorageResult<()> {
        if self.fail_writes {
            return Err(StorageError::BackendError(format!(
                "write to `{key}` refused"
            )));
        }
        self.data
            .write()
            .map_err(|_| Self::lock_error())?
            .insert(key.to_string(), data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();

        storage.write("libros.json", b"[]".to_vec()).await.unwrap();
        assert_eq!(
            storage.read("libros.json").await.unwrap(),
            Some(b"[]".to_vec())
        );
        assert_eq!(storage.read("missing").await.unwrap(), None);

        storage.write("libros.json", b"[{}]".to_vec()).await.unwrap();
        assert_eq!(
            storage.read("libros.json").await.unwrap(),
            Some(b"[{}]".to_vec())
        );
    }

    #[tokio::test]
    async fn test_local_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        assert_eq!(storage.read("apiKey").await.unwrap(), None);
        storage.write("apiKey", b"secret".to_vec()).await.unwrap();
        assert_eq!(
            storage.read("apiKey").await.unwrap(),
            Some(b"secret".to_vec())
        );
        assert!(!dir.path().join("apiKey.tmp").exists());
    }

    #[tokio::test]
    async fn test_local_storage_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        assert!(storage.write("../escape", b"x".to_vec()).await.is_err());
        assert!(storage.read("/etc/passwd").await.is_err());
    }
}
