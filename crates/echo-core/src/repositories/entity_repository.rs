//! Generic tenant-scoped repository trait (port)

use async_trait::async_trait;
use echo_shared::types::Page;
use uuid::Uuid;

use crate::domain::{EntityKind, ListQuery, TenantEntity};
use crate::error::DomainError;

/// Every method filters by `tenant_id`; rows of other tenants are invisible.
#[async_trait]
pub trait TenantScopedRepository<E: TenantEntity>: Send + Sync {
    async fn find_by_id(&self, tenant_id: &Uuid, id: &Uuid) -> Result<Option<E>, DomainError>;
    async fn list(&self, tenant_id: &Uuid, query: &ListQuery) -> Result<Page<E>, DomainError>;
    async fn create(&self, entity: &E) -> Result<E, DomainError>;
    /// `None` when the row vanished in the meantime.
    async fn update(&self, entity: &E) -> Result<Option<E>, DomainError>;
    /// `false` when nothing matched.
    async fn delete(&self, tenant_id: &Uuid, id: &Uuid) -> Result<bool, DomainError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceChecker: Send + Sync {
    async fn exists(&self, tenant_id: &Uuid, kind: EntityKind, id: &Uuid) -> Result<bool, DomainError>;
}
