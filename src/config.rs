// src/config.rs

use std::{env, path::PathBuf, sync::Arc};

use crate::{
    db::{BlobStore, CrmRepository, FileBlobStore, MemoryBlobStore},
    services::{CrmService, DashboardService},
};

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_STORAGE_KEY: &str = "customers";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    File,
    Memory,
}

impl StorageKind {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "file" => Ok(StorageKind::File),
            "memory" => Ok(StorageKind::Memory),
            other => anyhow::bail!("CRM_STORAGE inválido: '{other}' (use 'file' ou 'memory')"),
        }
    }
}

// A chave vira `<data_dir>/<chave>.json`: só um nome de arquivo simples
fn check_storage_key(key: &str) -> anyhow::Result<()> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-';
    if key.is_empty() || !key.chars().all(allowed) {
        anyhow::bail!("CRM_STORAGE_KEY inválido: '{key}' (use letras, números, '_' ou '-')");
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub storage_key: String,
    pub storage: StorageKind,
    pub bind_addr: String,
}

impl Settings {
    /// Lê o `.env` (se houver) e as variáveis `CRM_*`, com padrões para tudo.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let storage = match env::var("CRM_STORAGE") {
            Ok(value) => StorageKind::parse(&value)?,
            Err(_) => StorageKind::File,
        };

        let storage_key = env::var("CRM_STORAGE_KEY").unwrap_or_else(|_| DEFAULT_STORAGE_KEY.to_string());
        check_storage_key(&storage_key)?;

        Ok(Self {
            data_dir: env::var("CRM_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR)),
            storage_key,
            storage,
            bind_addr: env::var("CRM_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub crm_service: CrmService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        check_storage_key(&settings.storage_key)?;

        let store: Arc<dyn BlobStore> = match settings.storage {
            StorageKind::File => {
                tracing::info!("📁 Clientes gravados em {:?}", settings.data_dir);
                Arc::new(FileBlobStore::new(&settings.data_dir))
            }
            StorageKind::Memory => {
                tracing::warn!("Armazenamento em memória: nada sobrevive ao reinício");
                Arc::new(MemoryBlobStore::new())
            }
        };

        // --- Monta o gráfico de dependências ---
        let crm_repo = CrmRepository::new(store, settings.storage_key.clone());
        let crm_service = CrmService::load_from(crm_repo).await;

        Ok(Self::from_service(crm_service))
    }

    pub fn from_service(crm_service: CrmService) -> Self {
        let dashboard_service = DashboardService::new(crm_service.clone());
        Self {
            crm_service,
            dashboard_service,
        }
    }
}
