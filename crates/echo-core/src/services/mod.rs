//! Domain services (business logic)

pub mod crud;
pub mod auth_service;
pub mod dashboard_service;

pub use crud::CrudService;
pub use auth_service::{AuthService, AuthSession, RegisterInput, TenantInfo, UserInfo};
pub use dashboard_service::DashboardService;
