// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    config::AppState,
    // Importamos os models para referenciar no Swagger
    models::{crm::StatusCounts, dashboard::StatusChart},
};

// GET /api/dashboard/status-chart
#[utoipa::path(
    get,
    path = "/api/dashboard/status-chart",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Gráfico de pizza Leads x Clientes", body = StatusChart)
    )
)]
pub async fn get_status_chart(State(app_state): State<AppState>) -> impl IntoResponse {
    let chart = app_state.dashboard_service.get_status_chart().await;
    (StatusCode::OK, Json(chart))
}

// GET /api/dashboard/status-counts
#[utoipa::path(
    get,
    path = "/api/dashboard/status-counts",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Quantidade de clientes por status (todos os status)", body = StatusCounts)
    )
)]
pub async fn get_status_counts(State(app_state): State<AppState>) -> impl IntoResponse {
    let counts = app_state.dashboard_service.get_status_counts().await;
    (StatusCode::OK, Json(counts))
}
