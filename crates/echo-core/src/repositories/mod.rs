//! Repository traits (ports)

use std::sync::Arc;

pub mod entity_repository;
pub mod tenant_repository;
pub mod user_repository;
pub mod password_reset_repository;
pub mod dashboard_repository;
pub mod health;

pub use entity_repository::{ReferenceChecker, TenantScopedRepository};
pub use tenant_repository::TenantRepository;
pub use user_repository::UserRepository;
pub use password_reset_repository::PasswordResetRepository;
pub use dashboard_repository::DashboardRepository;
pub use health::StoreHealth;

use crate::domain::{Customer, Feedback, Goal, Idea, Initiative};

/// Every port the services need, wired by the chosen storage backend.
#[derive(Clone)]
pub struct Repositories {
    pub goals: Arc<dyn TenantScopedRepository<Goal>>,
    pub initiatives: Arc<dyn TenantScopedRepository<Initiative>>,
    pub customers: Arc<dyn TenantScopedRepository<Customer>>,
    pub feedback: Arc<dyn TenantScopedRepository<Feedback>>,
    pub ideas: Arc<dyn TenantScopedRepository<Idea>>,
    pub references: Arc<dyn ReferenceChecker>,
    pub tenants: Arc<dyn TenantRepository>,
    pub users: Arc<dyn UserRepository>,
    pub password_resets: Arc<dyn PasswordResetRepository>,
    pub dashboard: Arc<dyn DashboardRepository>,
    pub health: Arc<dyn StoreHealth>,
}
