// src/models/crm.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// --- STATUS ---

// Os dois status que o formulário oferece (e que o gráfico conhece).
// Qualquer outro valor é aceito e gravado como veio.
pub const STATUS_LEAD: &str = "lead";
pub const STATUS_CLIENT: &str = "client";

// Sentinela do filtro de status ("todos")
pub const STATUS_FILTER_ALL: &str = "all";

// --- CLIENTE (O Dado) ---

/// Um cliente como fica gravado no blob `customers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    #[schema(example = 1718030400000_i64)]
    pub id: i64,

    #[schema(example = "Maria da Silva")]
    pub name: String,

    #[schema(example = "maria@email.com")]
    pub email: String,

    #[schema(example = "1199998888")]
    pub phone: String,

    #[schema(example = "lead")]
    pub status: String,

    #[schema(example = "João")]
    pub technician: String,

    // Registros antigos podem não ter nota nem data de criação
    #[serde(default)]
    pub note: String,

    #[serde(default)]
    #[schema(example = "6/10/2024, 2:40:00 PM")]
    pub created_at: String,
}

impl CustomerRecord {
    /// Sobrescreve tudo menos `id` e `created_at`.
    pub fn apply(&mut self, fields: CustomerFields) {
        self.name = fields.name;
        self.email = fields.email;
        self.phone = fields.phone;
        self.status = fields.status;
        self.technician = fields.technician;
        self.note = fields.note;
    }
}

// --- FORMULÁRIO (O Candidato) ---

/// Campos enviados pelo formulário, antes de virarem um `CustomerRecord`.
// Campo ausente vira "" e cai nas regras de validação (400), não no extrator (422)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerFields {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Maria da Silva")]
    pub name: String,

    #[schema(example = "maria@email.com")]
    pub email: String,

    #[schema(example = "1199998888")]
    pub phone: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "lead")]
    pub status: String,

    #[schema(example = "João")]
    pub technician: String,

    #[schema(example = "Ligar na segunda")]
    pub note: String,
}

impl CustomerFields {
    // O formulário original faz trim em nome, e-mail, telefone e nota.
    // Status e técnico vêm de selects e passam como estão.
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            status: self.status,
            technician: self.technician,
            note: self.note.trim().to_string(),
        }
    }
}

impl From<&CustomerRecord> for CustomerFields {
    fn from(record: &CustomerRecord) -> Self {
        Self {
            name: record.name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            status: record.status.clone(),
            technician: record.technician.clone(),
            note: record.note.clone(),
        }
    }
}

// --- CONSULTA ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(String),
}

impl StatusFilter {
    pub fn matches(&self, status: &str) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl From<&str> for StatusFilter {
    // Vazio também conta como "all" (select sem valor)
    fn from(value: &str) -> Self {
        if value.is_empty() || value == STATUS_FILTER_ALL {
            StatusFilter::All
        } else {
            StatusFilter::Only(value.to_string())
        }
    }
}

/// Contagem de clientes por status. `lead` e `client` estão sempre presentes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct StatusCounts(pub BTreeMap<String, usize>);

impl StatusCounts {
    pub fn from_statuses<'a, I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts = BTreeMap::new();
        counts.insert(STATUS_LEAD.to_string(), 0);
        counts.insert(STATUS_CLIENT.to_string(), 0);

        for status in statuses {
            *counts.entry(status.to_string()).or_insert(0) += 1;
        }

        Self(counts)
    }

    pub fn get(&self, status: &str) -> usize {
        self.0.get(status).copied().unwrap_or(0)
    }

    pub fn leads(&self) -> usize {
        self.get(STATUS_LEAD)
    }

    pub fn clients(&self) -> usize {
        self.get(STATUS_CLIENT)
    }
}
