// ============================================================================
// Echo Infrastructure - PostgreSQL Idea Repository
// File: crates/echo-infrastructure/src/database/postgres/idea_repo_impl.rs
// Description: Ideas plus their `idea_customers` join rows
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use echo_core::domain::{Idea, IdeaEffort, IdeaPriority, IdeaStatus, ListQuery};
use echo_core::error::DomainError;
use echo_core::repositories::TenantScopedRepository;
use echo_shared::types::Page;

use super::listing::{db_error, fetch_page, Listing};

const SELECT: &str = r#"
    SELECT t.id, t.tenant_id, t.title, t.description, t.priority, t.effort, t.status,
        t.initiative_id, t.created_at, t.modified_at,
        ARRAY(
            SELECT ic.customer_id FROM idea_customers ic
            WHERE ic.idea_id = t.id
            ORDER BY ic.position
        ) AS customer_ids
    FROM ideas t
"#;

/// Importance, so that `order=desc` lists urgent ideas first.
const PRIORITY_ORDER: &str =
    "CASE t.priority WHEN 'urgent' THEN 3 WHEN 'high' THEN 2 WHEN 'medium' THEN 1 ELSE 0 END";

const EFFORT_ORDER: &str =
    "CASE t.effort WHEN 'xs' THEN 0 WHEN 's' THEN 1 WHEN 'm' THEN 2 WHEN 'l' THEN 3 ELSE 4 END";

pub struct PgIdeaRepository {
    pool: PgPool,
}

impl PgIdeaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct IdeaRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub effort: String,
    pub status: String,
    pub customer_ids: Vec<Uuid>,
    pub initiative_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<IdeaRow> for Idea {
    fn from(row: IdeaRow) -> Self {
        Idea {
            id: row.id,
            tenant_id: row.tenant_id,
            title: row.title,
            description: row.description,
            priority: IdeaPriority::from_str(&row.priority).unwrap_or_default(),
            effort: IdeaEffort::from_str(&row.effort).unwrap_or_default(),
            status: IdeaStatus::from_str(&row.status).unwrap_or_default(),
            customer_ids: row.customer_ids,
            initiative_id: row.initiative_id,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

fn sort_column(field: &str) -> &'static str {
    match field {
        "title" => "LOWER(t.title)",
        "priority" => PRIORITY_ORDER,
        "effort" => EFFORT_ORDER,
        "status" => "t.status",
        "modified_at" => "t.modified_at",
        _ => "t.created_at",
    }
}

/// Rewrites the join rows of one idea, keeping the given order.
async fn replace_customers(conn: &mut PgConnection, idea: &Idea) -> Result<(), DomainError> {
    sqlx::query("DELETE FROM idea_customers WHERE idea_id = $1")
        .bind(idea.id)
        .execute(&mut *conn)
        .await
        .map_err(db_error("clearing idea customers"))?;

    if idea.customer_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO idea_customers (idea_id, customer_id, position)
        SELECT $1, c.customer_id, (c.ord - 1)::INTEGER
        FROM UNNEST($2::UUID[]) WITH ORDINALITY AS c(customer_id, ord)
        "#,
    )
    .bind(idea.id)
    .bind(&idea.customer_ids)
    .execute(&mut *conn)
    .await
    .map_err(db_error("linking idea customers"))?;

    Ok(())
}

#[async_trait]
impl TenantScopedRepository<Idea> for PgIdeaRepository {
    async fn find_by_id(&self, tenant_id: &Uuid, id: &Uuid) -> Result<Option<Idea>, DomainError> {
        let row: Option<IdeaRow> = sqlx::query_as(&format!(
            "{} WHERE t.id = $1 AND t.tenant_id = $2",
            SELECT
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding idea by id"))?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, tenant_id: &Uuid, query: &ListQuery) -> Result<Page<Idea>, DomainError> {
        let listing = Listing {
            select: SELECT,
            count: "SELECT COUNT(*) FROM ideas t",
            search_columns: &["t.title", "t.description"],
        };
        let status = query.status.as_deref().map(IdeaStatus::parse).transpose()?;
        let priority = query.priority.as_deref().map(IdeaPriority::parse).transpose()?;
        let initiative_id = query.initiative_id;
        let customer_id = query.customer_id;

        fetch_page::<IdeaRow, Idea, _>(
            &self.pool,
            &listing,
            *tenant_id,
            query,
            sort_column(query.sort_field()),
            |qb: &mut QueryBuilder<'_, Postgres>| {
                if let Some(status) = &status {
                    qb.push(" AND t.status = ").push_bind(status.as_str());
                }
                if let Some(priority) = &priority {
                    qb.push(" AND t.priority = ").push_bind(priority.as_str());
                }
                if let Some(initiative_id) = initiative_id {
                    qb.push(" AND t.initiative_id = ").push_bind(initiative_id);
                }
                if let Some(customer_id) = customer_id {
                    qb.push(" AND EXISTS (SELECT 1 FROM idea_customers ic WHERE ic.idea_id = t.id AND ic.customer_id = ")
                        .push_bind(customer_id)
                        .push(")");
                }
            },
        )
        .await
    }

    async fn create(&self, idea: &Idea) -> Result<Idea, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting transaction"))?;

        sqlx::query(
            r#"
            INSERT INTO ideas (
                id, tenant_id, title, description, priority, effort, status, initiative_id, created_at, modified_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(idea.id)
        .bind(idea.tenant_id)
        .bind(&idea.title)
        .bind(&idea.description)
        .bind(idea.priority.as_str())
        .bind(idea.effort.as_str())
        .bind(idea.status.as_str())
        .bind(idea.initiative_id)
        .bind(idea.created_at)
        .bind(idea.modified_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error("creating idea"))?;

        replace_customers(&mut tx, idea).await?;
        tx.commit().await.map_err(db_error("committing idea"))?;

        info!("Idea created: {} ({} customers)", idea.id, idea.customer_ids.len());
        Ok(idea.clone())
    }

    async fn update(&self, idea: &Idea) -> Result<Option<Idea>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_error("starting transaction"))?;

        let result = sqlx::query(
            r#"
            UPDATE ideas
            SET title = $3, description = $4, priority = $5, effort = $6, status = $7,
                initiative_id = $8, modified_at = $9
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(idea.id)
        .bind(idea.tenant_id)
        .bind(&idea.title)
        .bind(&idea.description)
        .bind(idea.priority.as_str())
        .bind(idea.effort.as_str())
        .bind(idea.status.as_str())
        .bind(idea.initiative_id)
        .bind(idea.modified_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error("updating idea"))?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Ok(None);
        }

        replace_customers(&mut tx, idea).await?;
        tx.commit().await.map_err(db_error("committing idea"))?;

        Ok(Some(idea.clone()))
    }

    async fn delete(&self, tenant_id: &Uuid, id: &Uuid) -> Result<bool, DomainError> {
        // Join rows go with ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM ideas WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting idea"))?;

        Ok(result.rows_affected() > 0)
    }
}
