//! Dashboard aggregation trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::DashboardSummary;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardRepository: Send + Sync {
    /// Counts only contain labels that have rows; callers fill the gaps.
    async fn summary(&self, tenant_id: &Uuid, recent_limit: u32) -> Result<DashboardSummary, DomainError>;
}
