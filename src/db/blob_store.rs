// src/db/blob_store.rs

use std::{collections::HashMap, io::ErrorKind, path::PathBuf, sync::Mutex};

use async_trait::async_trait;
use tokio::fs;

use crate::common::error::AppError;

/// Armazenamento chave-valor de blobs (o "localStorage" do servidor).
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// `Ok(None)` quando a chave não existe.
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    async fn put(&self, key: &str, blob: &str) -> Result<(), AppError>;
}

// =========================================================================
//  ARQUIVO (um .json por chave)
// =========================================================================

#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Persistence(format!("falha ao ler '{key}': {e}"))),
        }
    }

    async fn put(&self, key: &str, blob: &str) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Persistence(format!("falha ao criar {:?}: {e}", self.dir)))?;

        // Escreve num temporário e renomeia: nunca deixa o snapshot pela metade
        let final_path = self.path_for(key);
        let tmp_path = self.dir.join(format!("{key}.json.tmp"));

        fs::write(&tmp_path, blob)
            .await
            .map_err(|e| AppError::Persistence(format!("falha ao gravar '{key}': {e}")))?;
        fs::rename(&tmp_path, &final_path)
            .await
            .map_err(|e| AppError::Persistence(format!("falha ao gravar '{key}': {e}")))?;

        Ok(())
    }
}

// =========================================================================
//  MEMÓRIA (CRM_STORAGE=memory e testes)
// =========================================================================

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, AppError> {
        self.blobs
            .lock()
            .map_err(|_| AppError::Persistence("memory store poisoned".to_string()))
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn put(&self, key: &str, blob: &str) -> Result<(), AppError> {
        self.lock()?.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}
