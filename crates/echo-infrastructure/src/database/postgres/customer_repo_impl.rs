// ============================================================================
// Echo Infrastructure - PostgreSQL Customer Repository
// File: crates/echo-infrastructure/src/database/postgres/customer_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use echo_core::domain::{Customer, CustomerStatus, ListQuery};
use echo_core::error::DomainError;
use echo_core::repositories::TenantScopedRepository;
use echo_shared::types::Page;

use super::listing::{db_error, fetch_page, Listing};

/// Counts are derived on every read and never stored.
const SELECT: &str = r#"
    SELECT t.id, t.tenant_id, t.name, t.status, t.revenue, t.created_at, t.modified_at,
        (SELECT COUNT(*) FROM idea_customers ic WHERE ic.customer_id = t.id) AS idea_count,
        (SELECT COUNT(*) FROM feedback f WHERE f.customer_id = t.id) AS feedback_count
    FROM customers t
"#;

pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CustomerRow {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub status: String,
    pub revenue: Option<String>,
    pub idea_count: i64,
    pub feedback_count: i64,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            status: CustomerStatus::from_str(&row.status).unwrap_or_default(),
            revenue: row.revenue,
            idea_count: row.idea_count,
            feedback_count: row.feedback_count,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

fn sort_column(field: &str) -> &'static str {
    match field {
        "name" => "LOWER(t.name)",
        "status" => "t.status",
        "idea_count" => "idea_count",
        "feedback_count" => "feedback_count",
        "modified_at" => "t.modified_at",
        _ => "t.created_at",
    }
}

impl PgCustomerRepository {
    async fn fetch(&self, tenant_id: &Uuid, id: &Uuid) -> Result<Option<Customer>, DomainError> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            "{} WHERE t.id = $1 AND t.tenant_id = $2",
            SELECT
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("finding customer by id"))?;

        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl TenantScopedRepository<Customer> for PgCustomerRepository {
    async fn find_by_id(&self, tenant_id: &Uuid, id: &Uuid) -> Result<Option<Customer>, DomainError> {
        self.fetch(tenant_id, id).await
    }

    async fn list(&self, tenant_id: &Uuid, query: &ListQuery) -> Result<Page<Customer>, DomainError> {
        let listing = Listing {
            select: SELECT,
            count: "SELECT COUNT(*) FROM customers t",
            search_columns: &["t.name", "t.revenue"],
        };
        let status = query.status.as_deref().map(CustomerStatus::parse).transpose()?;

        fetch_page::<CustomerRow, Customer, _>(
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

    async fn create(&self, customer: &Customer) -> Result<Customer, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, tenant_id, name, status, revenue, created_at, modified_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(customer.id)
        .bind(customer.tenant_id)
        .bind(&customer.name)
        .bind(customer.status.as_str())
        .bind(&customer.revenue)
        .bind(customer.created_at)
        .bind(customer.modified_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("creating customer"))?;

        info!("Customer created: {}", customer.id);
        Ok(customer.clone())
    }

    async fn update(&self, customer: &Customer) -> Result<Option<Customer>, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET name = $3, status = $4, revenue = $5, modified_at = $6
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(customer.id)
        .bind(customer.tenant_id)
        .bind(&customer.name)
        .bind(customer.status.as_str())
        .bind(&customer.revenue)
        .bind(customer.modified_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("updating customer"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch(&customer.tenant_id, &customer.id).await
    }

    async fn delete(&self, tenant_id: &Uuid, id: &Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("deleting customer"))?;

        Ok(result.rows_affected() > 0)
    }
}
