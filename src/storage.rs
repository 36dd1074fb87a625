//! Backends for the [`Storage`] trait

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::BoxError;
use crate::traits::Storage;


/// A storage that keeps every document in its own JSON file, inside a folder
#[derive(Clone, Debug)]
pub struct FolderStorage {
    folder: PathBuf,
}

impl FolderStorage {
    /// The folder does not have to exist yet, it is created on the first write
    pub fn new(folder: &Path) -> Self {
        Self { folder: PathBuf::from(folder) }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    fn document_path(&self, key: &str) -> PathBuf {
        let file_name = sanitize_filename::sanitize(format!("{}.json", key));
        self.folder.join(file_name)
    }
}

#[async_trait]
impl Storage for FolderStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, BoxError> {
        let path = self.document_path(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(format!("Unable to read {:?}: {}", path, err).into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), BoxError> {
        tokio::fs::create_dir_all(&self.folder).await?;
        let path = self.document_path(key);
        if let Err(err) = tokio::fs::write(&path, value).await {
            return Err(format!("Unable to write {:?}: {}", path, err).into());
        }
        Ok(())
    }
}


/// A storage that lives in memory only. Clones share the same documents
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    documents: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, BoxError> {
        let documents = self.documents.lock().map_err(|_| "memory storage is poisoned")?;
        Ok(documents.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), BoxError> {
        let mut documents = self.documents.lock().map_err(|_| "memory storage is poisoned")?;
        documents.insert(key.to_string(), value.to_string());
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn folder_storage_round_trip() {
        let folder = std::env::temp_dir().join(format!("planner-storage-{}", uuid::Uuid::new_v4()));
        let storage = FolderStorage::new(&folder);

        assert_eq!(storage.get_item("events").await.unwrap(), None);
        storage.set_item("events", "{}").await.unwrap();
        assert_eq!(storage.get_item("events").await.unwrap(), Some("{}".to_string()));

        // keys never escape the folder
        storage.set_item("../escape", "[]").await.unwrap();
        assert!(folder.parent().unwrap().join("escape.json").exists() == false);

        let _ = std::fs::remove_dir_all(&folder);
    }

    #[tokio::test]
    async fn memory_storage_clones_share_documents() {
        let storage = MemoryStorage::new();
        let clone = storage.clone();
        clone.set_item("todos", "[]").await.unwrap();
        assert_eq!(storage.get_item("todos").await.unwrap(), Some("[]".to_string()));
    }
}
