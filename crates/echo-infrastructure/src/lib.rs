//! # Echo Infrastructure
//!
//! Storage adapters for the repository ports: PostgreSQL through sqlx and an
//! in-memory store for development and tests.

pub mod database;
pub mod memory;

use std::sync::Arc;

use echo_core::repositories::Repositories;
use sqlx::PgPool;

pub use database::{create_pool, run_migrations};
pub use memory::MemoryStore;

use database::postgres::{
    PgCustomerRepository, PgDashboardRepository, PgFeedbackRepository, PgGoalRepository,
    PgIdeaRepository, PgInitiativeRepository, PgPasswordResetRepository, PgReferenceChecker,
    PgStoreHealth, PgTenantRepository, PgUserRepository,
};

/// Wires every port to PostgreSQL. The pool is reference counted, so each
/// repository holds a cheap clone.
pub fn postgres_repositories(pool: PgPool) -> Repositories {
    Repositories {
        goals: Arc::new(PgGoalRepository::new(pool.clone())),
        initiatives: Arc::new(PgInitiativeRepository::new(pool.clone())),
        customers: Arc::new(PgCustomerRepository::new(pool.clone())),
        feedback: Arc::new(PgFeedbackRepository::new(pool.clone())),
        ideas: Arc::new(PgIdeaRepository::new(pool.clone())),
        references: Arc::new(PgReferenceChecker::new(pool.clone())),
        tenants: Arc::new(PgTenantRepository::new(pool.clone())),
        users: Arc::new(PgUserRepository::new(pool.clone())),
        password_resets: Arc::new(PgPasswordResetRepository::new(pool.clone())),
        dashboard: Arc::new(PgDashboardRepository::new(pool.clone())),
        health: Arc::new(PgStoreHealth::new(pool)),
    }
}

/// Wires every port to one shared in-memory store.
pub fn memory_repositories() -> Repositories {
    let store = Arc::new(MemoryStore::new());
    Repositories {
        goals: store.clone(),
        initiatives: store.clone(),
        customers: store.clone(),
        feedback: store.clone(),
        ideas: store.clone(),
        references: store.clone(),
        tenants: store.clone(),
        users: store.clone(),
        password_resets: store.clone(),
        dashboard: store.clone(),
        health: store,
    }
}
