pub mod crm_service;
pub use crm_service::{CrmService, Submitted};
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
pub mod export_service;
pub mod validation;
