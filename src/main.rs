//src/main.rs

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Settings};
use crate::docs::ApiDoc;

pub(crate) fn build_router(app_state: AppState) -> Router {
    // Gestão de Clientes (o formulário)
    let crm_routes = Router::new()
        .route("/customers"
               ,post(handlers::crm::submit_customer)
               .get(handlers::crm::list_customers)
        )
        .route("/customers/export"
               ,get(handlers::crm::export_customers)
        )
        .route("/customers/{id}"
               ,get(handlers::crm::get_customer)
               .put(handlers::crm::update_customer)
               .delete(handlers::crm::delete_customer)
        )
        .route("/customers/{id}/edit"
               ,post(handlers::crm::begin_edit)
        )
        .route("/editing"
               ,get(handlers::crm::get_editing)
               .delete(handlers::crm::cancel_edit)
        );

    let dashboard_routes = Router::new()
        .route("/status-chart", get(handlers::dashboard::get_status_chart))
        .route("/status-counts", get(handlers::dashboard::get_status_counts));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/crm", crm_routes)
        .nest("/api/dashboard", dashboard_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuração primeiro: o .env pode trazer o RUST_LOG
    let settings = Settings::from_env()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new(&settings).await?;
    let app = build_router(app_state);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
