// ============================================================================
// Echo Infrastructure - PostgreSQL Dashboard Repository
// File: crates/echo-infrastructure/src/database/postgres/dashboard_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use echo_core::domain::{DashboardSummary, Feedback, StatusCounts};
use echo_core::error::DomainError;
use echo_core::repositories::DashboardRepository;

use super::feedback_repo_impl::{select_columns, FeedbackRow};
use super::listing::db_error;

pub struct PgDashboardRepository {
    pool: PgPool,
}

impl PgDashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `column` is one of our own constants, never user input.
    async fn counts(&self, table: &str, column: &str, tenant_id: &Uuid) -> Result<StatusCounts, DomainError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(&format!(
            "SELECT {column}, COUNT(*) FROM {table} WHERE tenant_id = $1 GROUP BY {column}"
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("counting dashboard rows"))?;

        Ok(rows
            .into_iter()
            .map(|(label, count)| (label, count.max(0) as u64))
            .collect())
    }
}

#[async_trait]
impl DashboardRepository for PgDashboardRepository {
    async fn summary(&self, tenant_id: &Uuid, recent_limit: u32) -> Result<DashboardSummary, DomainError> {
        let goals_by_status = self.counts("goals", "status", tenant_id).await?;
        let initiatives_by_status = self.counts("initiatives", "status", tenant_id).await?;
        let ideas_by_status = self.counts("ideas", "status", tenant_id).await?;
        let feedback_by_sentiment = self.counts("feedback", "sentiment", tenant_id).await?;

        let customer_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("counting customers"))?;

        let recent: Vec<FeedbackRow> = sqlx::query_as(&format!(
            "SELECT {} FROM feedback t WHERE t.tenant_id = $1 ORDER BY t.created_at DESC, t.id DESC LIMIT $2",
            select_columns()
        ))
        .bind(tenant_id)
        .bind(i64::from(recent_limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("loading recent feedback"))?;

        Ok(DashboardSummary {
            goals_by_status,
            initiatives_by_status,
            ideas_by_status,
            feedback_by_sentiment,
            customer_count: customer_count.max(0) as u64,
            recent_feedback: recent.into_iter().map(Feedback::from).collect(),
        })
    }
}
