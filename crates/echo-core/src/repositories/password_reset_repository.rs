//! Password reset repository trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::PasswordReset;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    async fn create(&self, reset: &PasswordReset) -> Result<(), DomainError>;
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<PasswordReset>, DomainError>;
    /// Returns `false` if the reset was already consumed.
    async fn mark_used(&self, id: &Uuid, used_at: DateTime<Utc>) -> Result<bool, DomainError>;
}
