//! Tenants, users and password resets for the memory store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use echo_core::domain::{PasswordReset, Tenant, User};
use echo_core::error::DomainError;
use echo_core::repositories::{PasswordResetRepository, TenantRepository, UserRepository};

use super::MemoryStore;

#[async_trait]
impl TenantRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Tenant>, DomainError> {
        Ok(self.tables.read().tenants.get(id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, DomainError> {
        let slug = slug.to_lowercase();
        Ok(self
            .tables
            .read()
            .tenants
            .values()
            .find(|tenant| tenant.slug == slug)
            .cloned())
    }

    async fn create_with_owner(&self, tenant: &Tenant, owner: &User) -> Result<(Tenant, User), DomainError> {
        let mut tables = self.tables.write();

        if tables.tenants.values().any(|t| t.slug == tenant.slug) {
            return Err(DomainError::TenantSlugAlreadyExists(tenant.slug.clone()));
        }
        if tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&owner.email))
        {
            return Err(DomainError::EmailAlreadyExists(owner.email.clone()));
        }

        tables.tenants.insert(tenant.id, tenant.clone());
        tables.users.insert(owner.id, owner.clone());
        info!("Tenant created in memory: {}", tenant.id);
        Ok((tenant.clone(), owner.clone()))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.tables.read().users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut tables = self.tables.write();
        let stored = tables.users.get_mut(&user.id).ok_or(DomainError::UserNotFound)?;
        *stored = user.clone();
        Ok(user.clone())
    }
}

#[async_trait]
impl PasswordResetRepository for MemoryStore {
    async fn create(&self, reset: &PasswordReset) -> Result<(), DomainError> {
        self.tables.write().password_resets.insert(reset.id, reset.clone());
        Ok(())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<PasswordReset>, DomainError> {
        Ok(self
            .tables
            .read()
            .password_resets
            .values()
            .find(|reset| reset.token_hash == token_hash)
            .cloned())
    }

    async fn mark_used(&self, id: &Uuid, used_at: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut tables = self.tables.write();
        match tables.password_resets.get_mut(id) {
            Some(reset) if reset.used_at.is_none() => {
                reset.used_at = Some(used_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
