// ============================================================================
// Echo Infrastructure - PostgreSQL Feedback Repository
// File: crates/echo-infrastructure/src/database/postgres/feedback_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use echo_core::domain::{Feedback, ListQuery, Sentiment};
use echo_core::error::DomainError;
use echo_core::repositories::TenantScopedRepository;
use echo_shared::types::Page;

use super::listing::{db_error, fetch_page, Listing};

const COLUMNS: &str = "t.id, t.tenant_id, t.title, t.description, t.sentiment, t.customer_id, t.initiative_id, t.created_at, t.modified_at";

pub struct PgFeedbackRepository {
    pool: PgPool,
}

impl PgFeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct FeedbackRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub sentiment: String,
    pub customer_id: Option<Uuid>,
    pub initiative_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<FeedbackRow> for Feedback {
    fn from(row: FeedbackRow) -> Self {
        Feedback {
            id: row.id,
            tenant_id: row.tenant_id,
            content: row.title.clone(),
            title: row.title,
            description: row.description,
            sentiment: Sentiment::from_str(&row.sentiment).unwrap_or_default(),
            customer_id: row.customer_id,
            initiative_id: row.initiative_id,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

pub(crate) fn select_columns() -> &'static str {
    COLUMNS
}

fn sort_column(field: &str) -> &'static str {
    match field {
        "title" => "LOWER(t.title)",
        "sentiment" => "t.sentiment",
        "modified_at" => "t.modified_at",
        _ => "t.created_at",
    }
}

#[async_trait]
impl TenantScopedRepository<Feedback> for PgFeedbackRepository {
    async fn find_by_id(&self, tenant_id: &Uuid, id: &Uuid) -> Result<Option<Feedback>, DomainError> {
        let row: Option<FeedbackRow> = sqlx::query_as(&format!(
            "SELECT {} FROM feedback t WHERE t.id = $1 AND t.tenant_id = $2",
            COLUMNS
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding feedback by id"))?;

        Ok(row.map(Into::into))
    }

    async fn list(&self, tenant_id: &Uuid, query: &ListQuery) -> Result<Page<Feedback>, DomainError> {
        let select = format!("SELECT {} FROM feedback t", COLUMNS);
        let listing = Listing {
            select: &select,
            count: "SELECT COUNT(*) FROM feedback t",
            search_columns: &["t.title", "t.description"],
        };
        let sentiment = query.sentiment.as_deref().map(Sentiment::parse).transpose()?;
        let customer_id = query.customer_id;
        let initiative_id = query.initiative_id;

        fetch_page::<FeedbackRow, Feedback, _>(
            &self.pool,
            &listing,
            *tenant_id,
            query,
            sort_column(query.sort_field()),
            |qb: &mut QueryBuilder<'_, Postgres>| {
                if let Some(sentiment) = &sentiment {
                    qb.push(" AND t.sentiment = ").push_bind(sentiment.as_str());
                }
                if let Some(customer_id) = customer_id {
                    qb.push(" AND t.customer_id = ").push_bind(customer_id);
                }
                if let Some(initiative_id) = initiative_id {
                    qb.push(" AND t.initiative_id = ").push_bind(initiative_id);
                }
            },
        )
        .await
    }

    async fn create(&self, feedback: &Feedback) -> Result<Feedback, DomainError> {
        let row: FeedbackRow = sqlx::query_as(
            r#"
            INSERT INTO feedback AS t (
                id, tenant_id, title, description, sentiment, customer_id, initiative_id, created_at, modified_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING t.id, t.tenant_id, t.title, t.description, t.sentiment, t.customer_id, t.initiative_id, t.created_at, t.modified_at
            "#,
        )
        .bind(feedback.id)
        .bind(feedback.tenant_id)
        .bind(&feedback.title)
        .bind(&feedback.description)
        .bind(feedback.sentiment.as_str())
        .bind(feedback.customer_id)
        .bind(feedback.initiative_id)
        .bind(feedback.created_at)
        .bind(feedback.modified_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("creating feedback"))?;

        info!("Feedback created: {}", row.id);
        Ok(row.into())
    }

    async fn update(&self, feedback: &Feedback) -> Result<Option<Feedback>, DomainError> {
        let row: Option<FeedbackRow> = sqlx::query_as(
            r#"
            UPDATE feedback AS t
            SET title = $3, description = $4, sentiment = $5, customer_id = $6, initiative_id = $7, modified_at = $8
            WHERE t.id = $1 AND t.tenant_id = $2
            RETURNING t.id, t.tenant_id, t.title, t.description, t.sentiment, t.customer_id, t.initiative_id, t.created_at, t.modified_at
            "#,
        )
        .bind(feedback.id)
        .bind(feedback.tenant_id)
        .bind(&feedback.title)
        .bind(&feedback.description)
        .bind(feedback.sentiment.as_str())
        .bind(feedback.customer_id)
        .bind(feedback.initiative_id)
        .bind(feedback.modified_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("updating feedback"))?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, tenant_id: &Uuid, id: &Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM feedback WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting feedback"))?;

        Ok(result.rows_affected() > 0)
    }
}
