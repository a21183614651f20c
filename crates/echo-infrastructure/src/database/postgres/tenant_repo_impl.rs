// ============================================================================
// Echo Infrastructure - PostgreSQL Tenant Repository
// File: crates/echo-infrastructure/src/database/postgres/tenant_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use echo_core::domain::{Tenant, User};
use echo_core::error::DomainError;
use echo_core::repositories::TenantRepository;

use super::user_repo_impl::UserRow;

pub struct PgTenantRepository {
    pool: PgPool,
}

impl PgTenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct TenantRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        Tenant {
            id: row.id,
            name: row.name,
            slug: row.slug,
            is_active: row.is_active,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

/// Unique violations carry the index name; map them to the matching conflict.
fn map_insert_error(e: sqlx::Error, tenant: &Tenant, owner: &User) -> DomainError {
    error!("Database error creating tenant: {}", e);
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return match db.constraint() {
                Some("idx_users_email") => DomainError::EmailAlreadyExists(owner.email.clone()),
                _ => DomainError::TenantSlugAlreadyExists(tenant.slug.clone()),
            };
        }
    }
    DomainError::DatabaseError(e.to_string())
}

#[async_trait]
impl TenantRepository for PgTenantRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Tenant>, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(
            r#"
            SELECT id, name, slug, is_active, created_at, modified_at
            FROM tenants
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding tenant by id: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, DomainError> {
        let row: Option<TenantRow> = sqlx::query_as(
            r#"
            SELECT id, name, slug, is_active, created_at, modified_at
            FROM tenants
            WHERE slug = LOWER($1)
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding tenant by slug: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|r| r.into()))
    }

    async fn create_with_owner(&self, tenant: &Tenant, owner: &User) -> Result<(Tenant, User), DomainError> {
        info!("Creating tenant: {}", tenant.slug);

        let mut tx = self.pool.begin().await.map_err(|e: sqlx::Error| {
            error!("Database error starting transaction: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        let tenant_row: TenantRow = sqlx::query_as(
            r#"
            INSERT INTO tenants (id, name, slug, is_active, created_at, modified_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, slug, is_active, created_at, modified_at
            "#,
        )
        .bind(tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.slug)
        .bind(tenant.is_active)
        .bind(tenant.created_at)
        .bind(tenant.modified_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_insert_error(e, tenant, owner))?;

        let user_row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (
                id, tenant_id, email, name, password_hash,
                role, is_active, last_login, created_at, modified_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING
                id, tenant_id, email, name, password_hash,
                role, is_active, last_login, created_at, modified_at
            "#,
        )
        .bind(owner.id)
        .bind(owner.tenant_id)
        .bind(&owner.email)
        .bind(&owner.name)
        .bind(&owner.password_hash)
        .bind(owner.role.as_str())
        .bind(owner.is_active)
        .bind(owner.last_login)
        .bind(owner.created_at)
        .bind(owner.modified_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_insert_error(e, tenant, owner))?;

        tx.commit().await.map_err(|e: sqlx::Error| {
            error!("Database error committing tenant: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        info!("Tenant created successfully: {}", tenant_row.id);
        Ok((tenant_row.into(), user_row.into()))
    }
}
