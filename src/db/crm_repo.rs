// src/db/crm_repo.rs

use std::{collections::HashSet, sync::Arc};

use crate::{
    common::error::AppError,
    db::BlobStore,
    models::crm::CustomerRecord,
};

#[derive(Clone)]
pub struct CrmRepository {
    store: Arc<dyn BlobStore>,
    key: String,
}

impl CrmRepository {
    pub fn new(store: Arc<dyn BlobStore>, key: impl Into<String>) -> Self {
        Self { store, key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Lê o snapshot inteiro. Ausente, corrompido ou ilegível vira lista vazia.
    /// Ids repetidos ficam só com a primeira ocorrência.
    pub async fn load_customers(&self) -> Vec<CustomerRecord> {
        let blob = match self.store.get(&self.key).await {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                tracing::info!(key = %self.key, "Nenhum cliente salvo ainda, começando vazio");
                return Vec::new();
            }
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Falha ao ler clientes, começando vazio");
                return Vec::new();
            }
        };

        // `null` também é aceito como vazio
        match serde_json::from_str::<Option<Vec<CustomerRecord>>>(&blob) {
            Ok(customers) => self.drop_duplicate_ids(customers.unwrap_or_default()),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Blob de clientes corrompido, começando vazio");
                Vec::new()
            }
        }
    }

    fn drop_duplicate_ids(&self, customers: Vec<CustomerRecord>) -> Vec<CustomerRecord> {
        let total = customers.len();
        let mut seen = HashSet::with_capacity(total);
        let unique: Vec<CustomerRecord> = customers.into_iter().filter(|c| seen.insert(c.id)).collect();

        if unique.len() < total {
            tracing::warn!(
                key = %self.key,
                dropped = total - unique.len(),
                "Ids repetidos no blob de clientes, mantendo a primeira ocorrência"
            );
        }

        unique
    }

    /// Grava o snapshot inteiro (sem escrita incremental).
    pub async fn save_customers(&self, customers: &[CustomerRecord]) -> Result<(), AppError> {
        let blob = serde_json::to_string(customers)
            .map_err(|e| AppError::Persistence(format!("falha ao serializar clientes: {e}")))?;

        self.store.put(&self.key, &blob).await?;
        tracing::debug!(key = %self.key, count = customers.len(), "Clientes gravados");

        Ok(())
    }
}
