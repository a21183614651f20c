//! PostgreSQL repository implementations

mod listing;

pub mod goal_repo_impl;
pub mod initiative_repo_impl;
pub mod customer_repo_impl;
pub mod feedback_repo_impl;
pub mod idea_repo_impl;
pub mod user_repo_impl;
pub mod tenant_repo_impl;
pub mod password_reset_repo_impl;
pub mod dashboard_repo_impl;
pub mod reference_repo_impl;

pub use goal_repo_impl::PgGoalRepository;
pub use initiative_repo_impl::PgInitiativeRepository;
pub use customer_repo_impl::PgCustomerRepository;
pub use feedback_repo_impl::PgFeedbackRepository;
pub use idea_repo_impl::PgIdeaRepository;
pub use user_repo_impl::PgUserRepository;
pub use tenant_repo_impl::PgTenantRepository;
pub use password_reset_repo_impl::PgPasswordResetRepository;
pub use dashboard_repo_impl::PgDashboardRepository;
pub use reference_repo_impl::{PgReferenceChecker, PgStoreHealth};
