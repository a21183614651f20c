// ============================================================================
// Echo Infrastructure - PostgreSQL Goal Repository
// File: crates/echo-infrastructure/src/database/postgres/goal_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use echo_core::domain::{Goal, GoalStatus, ListQuery};
use echo_core::error::DomainError;
use echo_core::repositories::TenantScopedRepository;
use echo_shared::types::Page;

use super::listing::{db_error, fetch_page, Listing};

const COLUMNS: &str = "t.id, t.tenant_id, t.title, t.description, t.status, t.target_date, t.created_at, t.modified_at";

pub struct PgGoalRepository {
    pool: PgPool,
}

impl PgGoalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct GoalRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub target_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<GoalRow> for Goal {
    fn from(row: GoalRow) -> Self {
        Goal {
            id: row.id,
            tenant_id: row.tenant_id,
            title: row.title,
            description: row.description,
            status: GoalStatus::from_str(&row.status).unwrap_or_default(),
            target_date: row.target_date,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

fn sort_column(field: &str) -> &'static str {
    match field {
        "title" => "LOWER(t.title)",
        "status" => "t.status",
        "target_date" => "t.target_date",
        "modified_at" => "t.modified_at",
        _ => "t.created_at",
    }
}

#[async_trait]
impl TenantScopedRepository<Goal> for PgGoalRepository {
    async fn find_by_id(&self, tenant_id: &Uuid, id: &Uuid) -> Result<Option<Goal>, DomainError> {
        let row: Option<GoalRow> = sqlx::query_as(&format!(
            "SELECT {} FROM goals t WHERE t.id = $1 AND t.tenant_id = $2",
            COLUMNS
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding goal by id"))?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, tenant_id: &Uuid, query: &ListQuery) -> Result<Page<Goal>, DomainError> {
        let select = format!("SELECT {} FROM goals t", COLUMNS);
        let listing = Listing {
            select: &select,
            count: "SELECT COUNT(*) FROM goals t",
            search_columns: &["t.title", "t.description"],
        };
        let status = query.status.as_deref().map(GoalStatus::parse).transpose()?;

        fetch_page::<GoalRow, Goal, _>(
            &self.pool,
            &listing,
            *tenant_id,
            query,
            sort_column(query.sort_field()),
            |qb: &mut QueryBuilder<'_, Postgres>| {
                if let Some(status) = &status {
                    qb.push(" AND t.status = ").push_bind(status.as_str());
                }
            },
        )
        .await
    }

    async fn create(&self, goal: &Goal) -> Result<Goal, DomainError> {
        let row: GoalRow = sqlx::query_as(
            r#"
            INSERT INTO goals AS t (id, tenant_id, title, description, status, target_date, created_at, modified_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING t.id, t.tenant_id, t.title, t.description, t.status, t.target_date, t.created_at, t.modified_at
            "#,
        )
        .bind(goal.id)
        .bind(goal.tenant_id)
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(goal.status.as_str())
        .bind(goal.target_date)
        .bind(goal.created_at)
        .bind(goal.modified_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("creating goal"))?;

        info!("Goal created: {}", row.id);
        Ok(row.into())
    }

    async fn update(&self, goal: &Goal) -> Result<Option<Goal>, DomainError> {
        let row: Option<GoalRow> = sqlx::query_as(
            r#"
            UPDATE goals AS t
            SET title = $3, description = $4, status = $5, target_date = $6, modified_at = $7
            WHERE t.id = $1 AND t.tenant_id = $2
            RETURNING t.id, t.tenant_id, t.title, t.description, t.status, t.target_date, t.created_at, t.modified_at
            "#,
        )
        .bind(goal.id)
        .bind(goal.tenant_id)
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(goal.status.as_str())
        .bind(goal.target_date)
        .bind(goal.modified_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("updating goal"))?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, tenant_id: &Uuid, id: &Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM goals WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting goal"))?;

        Ok(result.rows_affected() > 0)
    }
}
