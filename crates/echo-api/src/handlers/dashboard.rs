//! Tenant overview - GET /dashboard

use std::sync::Arc;

use axum::{extract::State, Json};
use echo_core::domain::DashboardSummary;
use echo_core::services::DashboardService;

use crate::error::ApiError;
use crate::extract::TenantContext;
use crate::response::ApiResponse;

pub async fn summary(
    State(dashboard): State<Arc<DashboardService>>,
    tenant: TenantContext,
) -> Result<Json<ApiResponse<DashboardSummary>>, ApiError> {
    let summary = dashboard.summary(&tenant.tenant_id).await?;
    Ok(Json(ApiResponse::success(summary)))
}
