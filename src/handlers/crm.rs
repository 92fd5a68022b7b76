// src/handlers/crm.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::crm::{CustomerFields, CustomerRecord, StatusFilter},
    services::{export_service, Submitted},
};

// Trim + campos obrigatórios do formulário (nome e status)
fn checked_fields(payload: CustomerFields, locale: &Locale) -> Result<CustomerFields, ApiError> {
    let fields = payload.trimmed();
    fields
        .validate()
        .map_err(|e| AppError::FormValidation(e).to_api_error(locale))?;
    Ok(fields)
}

// =============================================================================
//  ÁREA 1: LISTAGEM E BUSCA
// =============================================================================

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct CustomerQuery {
    /// Trecho do nome (sem diferenciar maiúsculas)
    pub search: String,
    /// Status exato, ou "all"
    pub status: Option<String>,
}

// GET /api/crm/customers
#[utoipa::path(
    get,
    path = "/api/crm/customers",
    tag = "CRM",
    params(CustomerQuery),
    responses(
        (status = 200, description = "Clientes filtrados, na ordem de cadastro", body = Vec<CustomerRecord>)
    )
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    Query(query): Query<CustomerQuery>,
) -> impl IntoResponse {
    let filter = StatusFilter::from(query.status.as_deref().unwrap_or_default());
    let customers = app_state.crm_service.query(&query.search, &filter).await;

    (StatusCode::OK, Json(customers))
}

// GET /api/crm/customers/{id}
#[utoipa::path(
    get,
    path = "/api/crm/customers/{id}",
    tag = "CRM",
    params(("id" = i64, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente", body = CustomerRecord),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = app_state
        .crm_service
        .find(id)
        .await
        .ok_or_else(|| AppError::NotFound(id).to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(customer)))
}

// =============================================================================
//  ÁREA 2: FORMULÁRIO (CRIAR / EDITAR)
// =============================================================================

// POST /api/crm/customers
#[utoipa::path(
    post,
    path = "/api/crm/customers",
    tag = "CRM",
    request_body = CustomerFields,
    responses(
        (status = 201, description = "Cliente criado (sem edição em andamento)", body = CustomerRecord),
        (status = 200, description = "Cliente em edição atualizado", body = CustomerRecord),
        (status = 400, description = "Dados inválidos"),
        (status = 500, description = "Falha ao gravar")
    )
)]
pub async fn submit_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CustomerFields>,
) -> Result<impl IntoResponse, ApiError> {
    let fields = checked_fields(payload, &locale)?;

    let submitted = app_state
        .crm_service
        .submit(fields)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    tracing::debug!(id = submitted.record().id, "Formulário enviado");
    let status = match submitted {
        Submitted::Created(_) => StatusCode::CREATED,
        Submitted::Updated(_) => StatusCode::OK,
    };

    Ok((status, Json(submitted.into_record())))
}

// PUT /api/crm/customers/{id}
#[utoipa::path(
    put,
    path = "/api/crm/customers/{id}",
    tag = "CRM",
    request_body = CustomerFields,
    params(("id" = i64, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente atualizado", body = CustomerRecord),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerFields>,
) -> Result<impl IntoResponse, ApiError> {
    let fields = checked_fields(payload, &locale)?;

    let customer = app_state
        .crm_service
        .update(id, fields)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(customer)))
}

// DELETE /api/crm/customers/{id}
#[utoipa::path(
    delete,
    path = "/api/crm/customers/{id}",
    tag = "CRM",
    params(("id" = i64, Path, description = "ID do cliente")),
    responses(
        (status = 204, description = "Removido (ou já não existia)"),
        (status = 500, description = "Falha ao gravar")
    )
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .crm_service
        .delete(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 3: EDIÇÃO EM ANDAMENTO
// =============================================================================

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditingState {
    pub editing_id: Option<i64>,
}

// POST /api/crm/customers/{id}/edit
#[utoipa::path(
    post,
    path = "/api/crm/customers/{id}/edit",
    tag = "CRM",
    params(("id" = i64, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente marcado para edição; dados para preencher o formulário", body = CustomerRecord),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn begin_edit(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = app_state
        .crm_service
        .begin_edit(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(customer)))
}

// GET /api/crm/editing
#[utoipa::path(
    get,
    path = "/api/crm/editing",
    tag = "CRM",
    responses((status = 200, description = "Cliente em edição (se houver)", body = EditingState))
)]
pub async fn get_editing(State(app_state): State<AppState>) -> impl IntoResponse {
    let editing_id = app_state.crm_service.editing().await;
    Json(EditingState { editing_id })
}

// DELETE /api/crm/editing
#[utoipa::path(
    delete,
    path = "/api/crm/editing",
    tag = "CRM",
    responses((status = 204, description = "Edição cancelada"))
)]
pub async fn cancel_edit(State(app_state): State<AppState>) -> impl IntoResponse {
    app_state.crm_service.cancel_edit().await;
    StatusCode::NO_CONTENT
}

// =============================================================================
//  ÁREA 4: EXPORTAÇÃO
// =============================================================================

// GET /api/crm/customers/export
#[utoipa::path(
    get,
    path = "/api/crm/customers/export",
    tag = "CRM",
    responses(
        (status = 200, description = "CSV com todos os clientes", content_type = "text/csv", body = String)
    )
)]
pub async fn export_customers(State(app_state): State<AppState>) -> impl IntoResponse {
    let customers = app_state.crm_service.all().await;
    let csv = export_service::customers_to_csv(&customers);
    tracing::info!(count = customers.len(), "Clientes exportados");

    let headers = [
        (header::CONTENT_TYPE, export_service::CSV_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export_service::CSV_FILENAME),
        ),
    ];

    (headers, csv)
}
