//! Shared plumbing for paginated, tenant-scoped listings.

use echo_core::domain::ListQuery;
use echo_core::error::DomainError;
use echo_shared::types::Page;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::error;

/// Fixed parts of one collection's listing SQL.
pub(crate) struct Listing<'a> {
    /// `SELECT <columns> FROM <table> <alias>`
    pub select: &'a str,
    /// `SELECT COUNT(*) FROM <table> <alias>`
    pub count: &'a str,
    /// Columns matched by `?search=` (case-insensitive substring).
    pub search_columns: &'a [&'a str],
}

/// Runs the count and the page query with an identical WHERE clause.
/// `push_filters` appends entity-specific `AND ...` conditions after the
/// tenant predicate; `order_by` must come from a whitelist.
pub(crate) async fn fetch_page<R, E, F>(
    pool: &PgPool,
    listing: &Listing<'_>,
    tenant_id: uuid::Uuid,
    query: &ListQuery,
    order_by: &str,
    push_filters: F,
) -> Result<Page<E>, DomainError>
where
    R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    E: From<R>,
    F: Fn(&mut QueryBuilder<'_, Postgres>),
{
    let pagination = query.pagination();
    let search = query.search_term().map(|term| format!("%{}%", escape_like(&term)));

    let push_where = |qb: &mut QueryBuilder<'_, Postgres>| {
        qb.push(" WHERE t.tenant_id = ").push_bind(tenant_id);
        push_filters(qb);
        if let Some(pattern) = &search {
            qb.push(" AND (");
            for (i, column) in listing.search_columns.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push("LOWER(COALESCE(")
                    .push(*column)
                    .push(", '')) LIKE ")
                    .push_bind(pattern.clone());
            }
            qb.push(")");
        }
    };

    let mut count_qb = QueryBuilder::<Postgres>::new(listing.count);
    push_where(&mut count_qb);
    let total: i64 = count_qb
        .build_query_scalar()
        .fetch_one(pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error counting rows: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

    let direction = query.order.as_sql();
    let mut page_qb = QueryBuilder::<Postgres>::new(listing.select);
    push_where(&mut page_qb);
    page_qb
        .push(" ORDER BY ")
        .push(order_by)
        .push(" ")
        .push(direction)
        .push(" NULLS LAST, t.id ")
        .push(direction)
        .push(" LIMIT ")
        .push_bind(pagination.limit() as i64)
        .push(" OFFSET ")
        .push_bind(pagination.offset() as i64);

    let rows: Vec<R> = page_qb
        .build_query_as::<R>()
        .fetch_all(pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error listing rows: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

    Ok(Page::new(
        rows.into_iter().map(E::from).collect(),
        total.max(0) as u64,
        pagination,
    ))
}

/// `%` and `_` in user input match literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Maps a sqlx error to `DomainError`, logging it with the operation name.
pub(crate) fn db_error(operation: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| {
        error!("Database error {}: {}", operation, e);
        DomainError::DatabaseError(e.to_string())
    }
}
