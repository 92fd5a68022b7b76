// src/services/dashboard_service.rs

use crate::{
    models::{crm::StatusCounts, dashboard::StatusChart},
    services::crm_service::CrmService,
};

#[derive(Clone)]
pub struct DashboardService {
    crm: CrmService,
}

impl DashboardService {
    pub fn new(crm: CrmService) -> Self {
        Self { crm }
    }

    pub async fn get_status_counts(&self) -> StatusCounts {
        self.crm.count_by_status().await
    }

    pub async fn get_status_chart(&self) -> StatusChart {
        let counts = self.crm.count_by_status().await;
        StatusChart::from_counts(&counts)
    }
}
