// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- CRM ---
        handlers::crm::list_customers,
        handlers::crm::get_customer,
        handlers::crm::submit_customer,
        handlers::crm::update_customer,
        handlers::crm::delete_customer,
        handlers::crm::begin_edit,
        handlers::crm::get_editing,
        handlers::crm::cancel_edit,
        handlers::crm::export_customers,

        // --- Dashboard ---
        handlers::dashboard::get_status_chart,
        handlers::dashboard::get_status_counts,
    ),
    components(
        schemas(
            // --- CRM ---
            models::crm::CustomerRecord,
            models::crm::CustomerFields,
            models::crm::StatusCounts,
            handlers::crm::EditingState,

            // --- DASHBOARD ---
            models::dashboard::StatusChart,
            models::dashboard::ChartDataset,
        )
    ),
    tags(
        (name = "CRM", description = "Cadastro, edição, busca e exportação de clientes"),
        (name = "Dashboard", description = "Gráfico de status dos clientes")
    )
)]
pub struct ApiDoc;
