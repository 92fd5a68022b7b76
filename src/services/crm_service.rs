// src/services/crm_service.rs

use std::sync::Arc;

use anyhow::anyhow;
use chrono::{Local, Utc};
use tokio::sync::Mutex;

use crate::{
    common::error::AppError,
    db::CrmRepository,
    models::crm::{CustomerFields, CustomerRecord, StatusCounts, StatusFilter},
    services::validation,
};

// Formato de exibição do createdAt (igual ao toLocaleString do navegador en-US)
const CREATED_AT_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

// Estado em memória: a lista (ordem de inserção) + quem está sendo editado
#[derive(Debug, Default)]
struct CustomerStore {
    customers: Vec<CustomerRecord>,
    editing_id: Option<i64>,
}

impl CustomerStore {
    fn position(&self, id: i64) -> Option<usize> {
        self.customers.iter().position(|c| c.id == id)
    }

    // Timestamp em ms, mas sempre maior que todos os ids já usados
    fn next_id(&self, now_millis: i64) -> Result<i64, AppError> {
        match self.customers.iter().map(|c| c.id).max() {
            Some(max) if now_millis <= max => max
                .checked_add(1)
                .ok_or_else(|| AppError::Internal(anyhow!("ids esgotados: maior id salvo é {max}"))),
            _ => Ok(now_millis),
        }
    }
}

/// Resultado do envio do formulário.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    Created(CustomerRecord),
    Updated(CustomerRecord),
}

impl Submitted {
    pub fn record(&self) -> &CustomerRecord {
        match self {
            Submitted::Created(record) | Submitted::Updated(record) => record,
        }
    }

    pub fn into_record(self) -> CustomerRecord {
        match self {
            Submitted::Created(record) | Submitted::Updated(record) => record,
        }
    }
}

/// O dono da lista de clientes. Toda operação roda inteira sob o mesmo lock,
/// inclusive a gravação, então nunca duas se intercalam.
#[derive(Clone)]
pub struct CrmService {
    repo: CrmRepository,
    state: Arc<Mutex<CustomerStore>>,
}

impl CrmService {
    pub fn new(repo: CrmRepository) -> Self {
        Self {
            repo,
            state: Arc::new(Mutex::new(CustomerStore::default())),
        }
    }

    /// Cria o serviço já carregado do armazenamento.
    pub async fn load_from(repo: CrmRepository) -> Self {
        let service = Self::new(repo);
        service.load().await;
        service
    }

    // =========================================================================
    //  1. CICLO DE VIDA
    // =========================================================================

    /// Substitui o estado em memória pelo snapshot salvo. Nunca falha.
    pub async fn load(&self) -> usize {
        let customers = self.repo.load_customers().await;
        let count = customers.len();

        let mut store = self.state.lock().await;
        store.customers = customers;
        store.editing_id = None;

        tracing::info!(count, key = self.repo.key(), "Clientes carregados");
        count
    }

    // =========================================================================
    //  2. MUTAÇÕES (sempre gravam o snapshot inteiro)
    // =========================================================================

    pub async fn create(&self, fields: CustomerFields) -> Result<CustomerRecord, AppError> {
        let mut store = self.state.lock().await;
        self.create_locked(&mut store, fields).await
    }

    pub async fn update(&self, id: i64, fields: CustomerFields) -> Result<CustomerRecord, AppError> {
        let mut store = self.state.lock().await;
        self.update_locked(&mut store, id, fields).await
    }

    /// Remove se existir. Id ausente não é erro. Retorna se existia.
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut store = self.state.lock().await;

        let mut next = store.customers.clone();
        next.retain(|c| c.id != id);
        let existed = next.len() != store.customers.len();

        self.repo.save_customers(&next).await?;
        store.customers = next;

        if existed && store.editing_id == Some(id) {
            store.editing_id = None;
        }

        if existed {
            tracing::info!(id, "Cliente removido");
        } else {
            tracing::debug!(id, "Remoção ignorada, cliente não existe");
        }
        Ok(existed)
    }

    /// Envio do formulário: atualiza quem está em edição, senão cria.
    pub async fn submit(&self, fields: CustomerFields) -> Result<Submitted, AppError> {
        let mut store = self.state.lock().await;

        match store.editing_id {
            Some(id) => self.update_locked(&mut store, id, fields).await.map(Submitted::Updated),
            None => self.create_locked(&mut store, fields).await.map(Submitted::Created),
        }
    }

    async fn create_locked(
        &self,
        store: &mut CustomerStore,
        fields: CustomerFields,
    ) -> Result<CustomerRecord, AppError> {
        validation::validate(&fields)?;

        let record = CustomerRecord {
            id: store.next_id(Utc::now().timestamp_millis())?,
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            status: fields.status,
            technician: fields.technician,
            note: fields.note,
            created_at: Local::now().format(CREATED_AT_FORMAT).to_string(),
        };

        // Grava primeiro; memória só muda se o disco aceitou
        let mut next = store.customers.clone();
        next.push(record.clone());
        self.repo.save_customers(&next).await?;
        store.customers = next;

        tracing::info!(id = record.id, status = %record.status, "Cliente criado");
        Ok(record)
    }

    async fn update_locked(
        &self,
        store: &mut CustomerStore,
        id: i64,
        fields: CustomerFields,
    ) -> Result<CustomerRecord, AppError> {
        validation::validate(&fields)?;

        let index = store.position(id).ok_or(AppError::NotFound(id))?;

        let mut next = store.customers.clone();
        next[index].apply(fields);
        let updated = next[index].clone();

        self.repo.save_customers(&next).await?;
        store.customers = next;
        store.editing_id = None;

        tracing::info!(id, "Cliente atualizado");
        Ok(updated)
    }

    // =========================================================================
    //  3. EDIÇÃO (alvo do próximo envio do formulário)
    // =========================================================================

    /// Marca o cliente como alvo de edição e devolve os dados para o formulário.
    pub async fn begin_edit(&self, id: i64) -> Result<CustomerRecord, AppError> {
        let mut store = self.state.lock().await;

        let record = store
            .position(id)
            .map(|index| store.customers[index].clone())
            .ok_or(AppError::NotFound(id))?;
        store.editing_id = Some(id);

        tracing::debug!(id, "Edição iniciada");
        Ok(record)
    }

    pub async fn cancel_edit(&self) {
        self.state.lock().await.editing_id = None;
    }

    pub async fn editing(&self) -> Option<i64> {
        self.state.lock().await.editing_id
    }

    // =========================================================================
    //  4. CONSULTAS
    // =========================================================================

    pub async fn find(&self, id: i64) -> Option<CustomerRecord> {
        let store = self.state.lock().await;
        store.customers.iter().find(|c| c.id == id).cloned()
    }

    pub async fn all(&self) -> Vec<CustomerRecord> {
        self.state.lock().await.customers.clone()
    }

    /// Nome contém `name_substring` (sem diferenciar maiúsculas) E status bate no filtro.
    pub async fn query(&self, name_substring: &str, status: &StatusFilter) -> Vec<CustomerRecord> {
        let keyword = name_substring.to_lowercase();
        let store = self.state.lock().await;

        store
            .customers
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&keyword) && status.matches(&c.status))
            .cloned()
            .collect()
    }

    pub async fn count_by_status(&self) -> StatusCounts {
        let store = self.state.lock().await;
        StatusCounts::from_statuses(store.customers.iter().map(|c| c.status.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::ValidationError;
    use crate::db::{BlobStore, MemoryBlobStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    // Lê normalmente, mas pode recusar gravações (disco cheio)
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryBlobStore,
        fail_writes: AtomicBool,
    }

    #[async_trait]
    impl BlobStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
            self.inner.get(key).await
        }

        async fn put(&self, key: &str, blob: &str) -> Result<(), AppError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(AppError::Persistence("quota exceeded".into()));
            }
            self.inner.put(key, blob).await
        }
    }

    fn fields(name: &str, status: &str) -> CustomerFields {
        CustomerFields {
            name: name.into(),
            email: format!("{}@mail.com", name.to_lowercase().replace(' ', ".")),
            phone: "1234567890".into(),
            status: status.into(),
            technician: "Tech".into(),
            note: "first contact".into(),
        }
    }

    fn service() -> (CrmService, Arc<FlakyStore>) {
        let store = Arc::new(FlakyStore::default());
        let repo = CrmRepository::new(store.clone(), "customers");
        (CrmService::new(repo), store)
    }

    #[tokio::test]
    async fn create_then_find_returns_same_record() {
        let (crm, _) = service();
        let input = fields("Ana", "lead");

        let created = crm.create(input.clone()).await.unwrap();
        let found = crm.find(created.id).await.unwrap();

        assert_eq!(found, created);
        assert_eq!(CustomerFields::from(&found), input);
        assert!(!found.created_at.is_empty());
    }

    #[tokio::test]
    async fn create_rejects_invalid_fields_without_writing() {
        let (crm, store) = service();
        let bad = CustomerFields { phone: "123-456-7890".into(), ..fields("Ana", "lead") };

        let err = crm.create(bad).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(ValidationError::Phone)));
        assert!(crm.all().await.is_empty());
        assert_eq!(store.get("customers").await.unwrap(), None);
    }

    #[tokio::test]
    async fn ids_stay_unique_for_back_to_back_creates() {
        let (crm, _) = service();
        let mut ids = Vec::new();
        for i in 0..20 {
            ids.push(crm.create(fields(&format!("C{i}"), "lead")).await.unwrap().id);
        }

        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn next_id_jumps_past_ids_from_the_future() {
        let mut store = CustomerStore::default();
        assert_eq!(store.next_id(100).unwrap(), 100);

        store.customers.push(CustomerRecord {
            id: 500,
            name: "A".into(),
            email: "a@b.com".into(),
            phone: "1234567890".into(),
            status: "lead".into(),
            technician: "T".into(),
            note: String::new(),
            created_at: String::new(),
        });
        assert_eq!(store.next_id(100).unwrap(), 501);
        assert_eq!(store.next_id(900).unwrap(), 900);
    }

    #[tokio::test]
    async fn create_after_largest_possible_id_fails_without_writing() {
        let (crm, store) = service();
        let blob = format!(
            r#"[{{"id":{},"name":"Ana","email":"a@b.com","phone":"1234567890","status":"lead","technician":"T","note":"","createdAt":"x"}}]"#,
            i64::MAX
        );
        store.put("customers", &blob).await.unwrap();
        crm.load().await;

        let err = crm.create(fields("Bia", "lead")).await.unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(crm.all().await.len(), 1);
        assert_eq!(store.get("customers").await.unwrap().as_deref(), Some(blob.as_str()));

        // o lock não ficou envenenado: o serviço continua respondendo
        assert!(crm.find(i64::MAX).await.is_some());
    }

    #[tokio::test]
    async fn update_keeps_identity_and_creation_time() {
        let (crm, _) = service();
        let created = crm.create(fields("Ana", "lead")).await.unwrap();

        let new_fields = CustomerFields {
            note: "converted".into(),
            technician: "Other".into(),
            ..fields("Ana Paula", "client")
        };
        crm.update(created.id, new_fields.clone()).await.unwrap();

        let found = crm.find(created.id).await.unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.created_at, created.created_at);
        assert_eq!(CustomerFields::from(&found), new_fields);
    }

    #[tokio::test]
    async fn update_validates_before_looking_up_the_target() {
        let (crm, _) = service();

        let bad = CustomerFields { email: "a@b".into(), ..fields("Ana", "lead") };
        let err = crm.update(42, bad).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::Email)));

        let err = crm.update(42, fields("Ana", "lead")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(42)));
    }

    #[tokio::test]
    async fn delete_removes_and_missing_id_is_a_noop() {
        let (crm, _) = service();
        let a = crm.create(fields("Ana", "lead")).await.unwrap();
        crm.create(fields("Bia", "client")).await.unwrap();

        assert!(crm.delete(a.id).await.unwrap());
        assert!(crm.find(a.id).await.is_none());
        assert_eq!(crm.all().await.len(), 1);

        assert!(!crm.delete(123).await.unwrap());
        assert_eq!(crm.all().await.len(), 1);
    }

    #[tokio::test]
    async fn submit_creates_or_updates_depending_on_edit_target() {
        let (crm, _) = service();
        let first = match crm.submit(fields("Ana", "lead")).await.unwrap() {
            Submitted::Created(record) => record,
            other => panic!("expected a create, got {other:?}"),
        };
        assert_eq!(crm.all().await.len(), 1);

        let loaded = crm.begin_edit(first.id).await.unwrap();
        assert_eq!(loaded, first);
        assert_eq!(crm.editing().await, Some(first.id));

        let edited = match crm.submit(fields("Ana", "client")).await.unwrap() {
            Submitted::Updated(record) => record,
            other => panic!("expected an update, got {other:?}"),
        };
        assert_eq!(edited.id, first.id);
        assert_eq!(edited.status, "client");
        assert_eq!(crm.all().await.len(), 1);
        assert_eq!(crm.editing().await, None);

        let third = crm.submit(fields("Bia", "lead")).await.unwrap();
        assert!(matches!(third, Submitted::Created(_)));
        assert_ne!(third.record().id, first.id);
        assert_eq!(crm.all().await.len(), 2);
    }

    #[tokio::test]
    async fn failed_submit_keeps_edit_target() {
        let (crm, _) = service();
        let a = crm.create(fields("Ana", "lead")).await.unwrap();
        crm.begin_edit(a.id).await.unwrap();

        let bad = CustomerFields { technician: String::new(), ..fields("Ana", "lead") };
        assert!(crm.submit(bad).await.is_err());
        assert_eq!(crm.editing().await, Some(a.id));

        crm.cancel_edit().await;
        assert_eq!(crm.editing().await, None);
    }

    #[tokio::test]
    async fn begin_edit_unknown_id_is_not_found() {
        let (crm, _) = service();
        assert!(matches!(crm.begin_edit(9).await, Err(AppError::NotFound(9))));
        assert_eq!(crm.editing().await, None);
    }

    #[tokio::test]
    async fn deleting_the_edit_target_clears_the_slot() {
        let (crm, _) = service();
        let a = crm.create(fields("Ana", "lead")).await.unwrap();
        crm.begin_edit(a.id).await.unwrap();

        crm.delete(a.id).await.unwrap();

        assert_eq!(crm.editing().await, None);
    }

    #[tokio::test]
    async fn query_filters_by_name_and_status_in_insertion_order() {
        let (crm, _) = service();
        for (name, status) in [
            ("Ana Souza", "lead"),
            ("Bruno", "client"),
            ("Mariana", "client"),
            ("JOANA", "lead"),
            ("Carlos", "prospect"),
        ] {
            crm.create(fields(name, status)).await.unwrap();
        }

        let all = crm.query("", &StatusFilter::All).await;
        let names: Vec<_> = all.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Ana Souza", "Bruno", "Mariana", "JOANA", "Carlos"]);

        let ana = crm.query("ANA", &StatusFilter::All).await;
        let names: Vec<_> = ana.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Ana Souza", "Mariana", "JOANA"]);

        let ana_leads = crm.query("ana", &StatusFilter::from("lead")).await;
        let names: Vec<_> = ana_leads.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Ana Souza", "JOANA"]);

        assert!(crm.query("zzz", &StatusFilter::All).await.is_empty());
    }

    #[tokio::test]
    async fn count_by_status_tabulates_every_status() {
        let (crm, _) = service();
        for (i, status) in ["lead", "client", "lead", "client", "lead"].iter().enumerate() {
            crm.create(fields(&format!("C{i}"), status)).await.unwrap();
        }

        let counts = crm.count_by_status().await;
        assert_eq!(counts.leads(), 3);
        assert_eq!(counts.clients(), 2);
        assert_eq!(counts.0.len(), 2);
    }

    #[tokio::test]
    async fn reload_yields_identical_sequence() {
        let (crm, store) = service();
        crm.create(fields("Ana", "lead")).await.unwrap();
        let b = crm.create(fields("Bia", "client")).await.unwrap();
        crm.create(fields("Caio", "prospect")).await.unwrap();
        crm.update(b.id, fields("Bia Lima", "lead")).await.unwrap();
        let before = crm.all().await;

        let reloaded = CrmService::load_from(CrmRepository::new(store, "customers")).await;

        assert_eq!(reloaded.all().await, before);
    }

    #[tokio::test]
    async fn write_failure_surfaces_and_leaves_memory_untouched() {
        let (crm, store) = service();
        let a = crm.create(fields("Ana", "lead")).await.unwrap();
        store.fail_writes.store(true, Ordering::SeqCst);

        let err = crm.create(fields("Bia", "lead")).await.unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));

        let err = crm.update(a.id, fields("Ana", "client")).await.unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));

        assert!(crm.delete(a.id).await.is_err());

        assert_eq!(crm.all().await, vec![a]);
    }

    #[tokio::test]
    async fn load_with_corrupt_blob_starts_empty() {
        let (crm, store) = service();
        store.put("customers", "not json at all").await.unwrap();

        assert_eq!(crm.load().await, 0);
        assert!(crm.all().await.is_empty());
    }
}
