//! Storage liveness probe (port)

use async_trait::async_trait;

use crate::error::DomainError;

#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<(), DomainError>;
}
