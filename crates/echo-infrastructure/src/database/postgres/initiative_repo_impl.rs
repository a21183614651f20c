// ============================================================================
// Echo Infrastructure - PostgreSQL Initiative Repository
// File: crates/echo-infrastructure/src/database/postgres/initiative_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use echo_core::domain::{Initiative, InitiativeStatus, ListQuery};
use echo_core::error::DomainError;
use echo_core::repositories::TenantScopedRepository;
use echo_shared::types::Page;

use super::listing::{db_error, fetch_page, Listing};

const COLUMNS: &str = "t.id, t.tenant_id, t.title, t.description, t.status, t.priority, t.goal_id, t.created_at, t.modified_at";

pub struct PgInitiativeRepository {
    pool: PgPool,
}

impl PgInitiativeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct InitiativeRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: i32,
    pub goal_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<InitiativeRow> for Initiative {
    fn from(row: InitiativeRow) -> Self {
        Initiative {
            id: row.id,
            tenant_id: row.tenant_id,
            title: row.title,
            description: row.description,
            status: InitiativeStatus::from_str(&row.status).unwrap_or_default(),
            priority: row.priority,
            goal_id: row.goal_id,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

fn sort_column(field: &str) -> &'static str {
    match field {
        "title" => "LOWER(t.title)",
        "status" => "t.status",
        "priority" => "t.priority",
        "modified_at" => "t.modified_at",
        _ => "t.created_at",
    }
}

#[async_trait]
impl TenantScopedRepository<Initiative> for PgInitiativeRepository {
    async fn find_by_id(&self, tenant_id: &Uuid, id: &Uuid) -> Result<Option<Initiative>, DomainError> {
        let row: Option<InitiativeRow> = sqlx::query_as(&format!(
            "SELECT {} FROM initiatives t WHERE t.id = $1 AND t.tenant_id = $2",
            COLUMNS
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding initiative by id"))?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, tenant_id: &Uuid, query: &ListQuery) -> Result<Page<Initiative>, DomainError> {
        let select = format!("SELECT {} FROM initiatives t", COLUMNS);
        let listing = Listing {
            select: &select,
            count: "SELECT COUNT(*) FROM initiatives t",
            search_columns: &["t.title", "t.description"],
        };
        let status = query.status.as_deref().map(InitiativeStatus::parse).transpose()?;
        let goal_id = query.goal_id;

        fetch_page::<InitiativeRow, Initiative, _>(
            &self.pool,
            &listing,
            *tenant_id,
            query,
            sort_column(query.sort_field()),
            |qb: &mut QueryBuilder<'_, Postgres>| {
                if let Some(status) = &status {
                    qb.push(" AND t.status = ").push_bind(status.as_str());
                }
                if let Some(goal_id) = goal_id {
                    qb.push(" AND t.goal_id = ").push_bind(goal_id);
                }
            },
        )
        .await
    }

    async fn create(&self, initiative: &Initiative) -> Result<Initiative, DomainError> {
        let row: InitiativeRow = sqlx::query_as(
            r#"
            INSERT INTO initiatives AS t (
                id, tenant_id, title, description, status, priority, goal_id, created_at, modified_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING t.id, t.tenant_id, t.title, t.description, t.status, t.priority, t.goal_id, t.created_at, t.modified_at
            "#,
        )
        .bind(initiative.id)
        .bind(initiative.tenant_id)
        .bind(&initiative.title)
        .bind(&initiative.description)
        .bind(initiative.status.as_str())
        .bind(initiative.priority)
        .bind(initiative.goal_id)
        .bind(initiative.created_at)
        .bind(initiative.modified_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("creating initiative"))?;

        info!("Initiative created: {}", row.id);
        Ok(row.into())
    }

    async fn update(&self, initiative: &Initiative) -> Result<Option<Initiative>, DomainError> {
        let row: Option<InitiativeRow> = sqlx::query_as(
            r#"
            UPDATE initiatives AS t
            SET title = $3, description = $4, status = $5, priority = $6, goal_id = $7, modified_at = $8
            WHERE t.id = $1 AND t.tenant_id = $2
            RETURNING t.id, t.tenant_id, t.title, t.description, t.status, t.priority, t.goal_id, t.created_at, t.modified_at
            "#,
        )
        .bind(initiative.id)
        .bind(initiative.tenant_id)
        .bind(&initiative.title)
        .bind(&initiative.description)
        .bind(initiative.status.as_str())
        .bind(initiative.priority)
        .bind(initiative.goal_id)
        .bind(initiative.modified_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("updating initiative"))?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, tenant_id: &Uuid, id: &Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM initiatives WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting initiative"))?;

        Ok(result.rows_affected() > 0)
    }
}
