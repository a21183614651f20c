//! Tenant repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Tenant, User};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Tenant>, DomainError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, DomainError>;
    /// Inserts the tenant and its first user atomically.
    async fn create_with_owner(&self, tenant: &Tenant, owner: &User) -> Result<(Tenant, User), DomainError>;
}
