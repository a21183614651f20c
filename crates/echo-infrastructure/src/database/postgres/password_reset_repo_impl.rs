// ============================================================================
// Echo Infrastructure - PostgreSQL Password Reset Repository
// File: crates/echo-infrastructure/src/database/postgres/password_reset_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use echo_core::domain::PasswordReset;
use echo_core::error::DomainError;
use echo_core::repositories::PasswordResetRepository;

use super::listing::db_error;

pub struct PgPasswordResetRepository {
    pool: PgPool,
}

impl PgPasswordResetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PasswordResetRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<PasswordResetRow> for PasswordReset {
    fn from(row: PasswordResetRow) -> Self {
        PasswordReset {
            id: row.id,
            user_id: row.user_id,
            token_hash: row.token_hash,
            expires_at: row.expires_at,
            used_at: row.used_at,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl PasswordResetRepository for PgPasswordResetRepository {
    async fn create(&self, reset: &PasswordReset) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO password_resets (id, user_id, token_hash, expires_at, used_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(reset.id)
        .bind(reset.user_id)
        .bind(&reset.token_hash)
        .bind(reset.expires_at)
        .bind(reset.used_at)
        .bind(reset.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("creating password reset"))?;

        Ok(())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<PasswordReset>, DomainError> {
        let row: Option<PasswordResetRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, token_hash, expires_at, used_at, created_at
            FROM password_resets
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding password reset"))?;

        Ok(row.map(Into::into))
    }

    async fn mark_used(&self, id: &Uuid, used_at: DateTime<Utc>) -> Result<bool, DomainError> {
        // Conditional update so two concurrent resets cannot both succeed
        let result = sqlx::query("UPDATE password_resets SET used_at = $2 WHERE id = $1 AND used_at IS NULL")
            .bind(id)
            .bind(used_at)
            .execute(&self.pool)
            .await
            .map_err(db_error("consuming password reset"))?;

        Ok(result.rows_affected() > 0)
    }
}
