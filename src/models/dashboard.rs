// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::crm::StatusCounts;

// Cores do gráfico de pizza (Leads amarelo, Clientes verde)
const LEAD_COLOR: &str = "#ffc107";
const CLIENT_COLOR: &str = "#28a745";

// 1. Uma série do gráfico
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub data: Vec<usize>,
    pub background_color: Vec<String>,
}

// 2. Gráfico de Status (pronto para o Chart.js do front)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusChart {
    #[serde(rename = "type")]
    #[schema(example = "pie")]
    pub chart_type: String,
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

impl StatusChart {
    // Só dois baldes: outros status ficam de fora do gráfico
    pub fn from_counts(counts: &StatusCounts) -> Self {
        Self {
            chart_type: "pie".to_string(),
            labels: vec!["Leads".to_string(), "Clients".to_string()],
            datasets: vec![ChartDataset {
                data: vec![counts.leads(), counts.clients()],
                background_color: vec![LEAD_COLOR.to_string(), CLIENT_COLOR.to_string()],
            }],
        }
    }
}
