// ============================================================================
// Echo API - Generic CRUD Routes
// File: crates/echo-api/src/routes/crud.rs
// ============================================================================
//! One set of handlers, instantiated per entity type.

use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use echo_core::domain::{ListQuery, TenantEntity};
use echo_core::services::CrudService;
use echo_shared::types::Page;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery, TenantContext};
use crate::state::AppState;

/// Routes for one collection, to be nested under its path:
/// `GET /`, `POST /`, `GET|PUT|PATCH|DELETE /{id}`.
pub fn crud_routes<E>() -> Router<AppState>
where
    E: TenantEntity,
    Arc<CrudService<E>>: FromRef<AppState>,
{
    Router::new()
        .route("/", get(list::<E>).post(create::<E>))
        .route(
            "/{id}",
            get(get_one::<E>)
                .put(update::<E>)
                .patch(update::<E>)
                .delete(delete::<E>),
        )
}

async fn list<E: TenantEntity>(
    State(service): State<Arc<CrudService<E>>>,
    tenant: TenantContext,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Page<E>>, ApiError> {
    let page = service.list(&tenant.tenant_id, &query).await?;
    Ok(Json(page))
}

async fn create<E: TenantEntity>(
    State(service): State<Arc<CrudService<E>>>,
    tenant: TenantContext,
    ApiJson(input): ApiJson<E::Create>,
) -> Result<(StatusCode, Json<E>), ApiError> {
    let created = service.create(&tenant.tenant_id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_one<E: TenantEntity>(
    State(service): State<Arc<CrudService<E>>>,
    tenant: TenantContext,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<E>, ApiError> {
    let entity = service.get(&tenant.tenant_id, &id).await?;
    Ok(Json(entity))
}

async fn update<E: TenantEntity>(
    State(service): State<Arc<CrudService<E>>>,
    tenant: TenantContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<E::Patch>,
) -> Result<Json<E>, ApiError> {
    let updated = service.update(&tenant.tenant_id, &id, patch).await?;
    Ok(Json(updated))
}

async fn delete<E: TenantEntity>(
    State(service): State<Arc<CrudService<E>>>,
    tenant: TenantContext,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    service.delete(&tenant.tenant_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
