// ============================================================================
// Echo Infrastructure - PostgreSQL Reference Checks and Health
// File: crates/echo-infrastructure/src/database/postgres/reference_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use echo_core::domain::EntityKind;
use echo_core::error::DomainError;
use echo_core::repositories::{ReferenceChecker, StoreHealth};

use super::listing::db_error;

pub struct PgReferenceChecker {
    pool: PgPool,
}

impl PgReferenceChecker {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceChecker for PgReferenceChecker {
    async fn exists(&self, tenant_id: &Uuid, kind: EntityKind, id: &Uuid) -> Result<bool, DomainError> {
        // Table names come from the closed EntityKind set
        let found: bool = sqlx::query_scalar(&format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1 AND tenant_id = $2)",
            kind.collection()
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("checking reference"))?;

        Ok(found)
    }
}

pub struct PgStoreHealth {
    pool: PgPool,
}

impl PgStoreHealth {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreHealth for PgStoreHealth {
    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error("pinging database"))?;
        Ok(())
    }
}
