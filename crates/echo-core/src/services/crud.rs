// ============================================================================
// Echo Core - Generic CRUD Service
// File: crates/echo-core/src/services/crud.rs
// ============================================================================
//! One service type drives every tenant-scoped collection. Entity-specific
//! behaviour (defaults, validation, references) lives on `TenantEntity`.

use std::sync::Arc;

use echo_shared::types::Page;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{ListQuery, TenantEntity};
use crate::error::DomainError;
use crate::repositories::{ReferenceChecker, TenantScopedRepository};

pub struct CrudService<E: TenantEntity> {
    repo: Arc<dyn TenantScopedRepository<E>>,
    references: Arc<dyn ReferenceChecker>,
}

impl<E: TenantEntity> CrudService<E> {
    pub fn new(repo: Arc<dyn TenantScopedRepository<E>>, references: Arc<dyn ReferenceChecker>) -> Self {
        Self { repo, references }
    }

    pub async fn create(&self, tenant_id: &Uuid, input: E::Create) -> Result<E, DomainError> {
        let entity = E::create(*tenant_id, input)?;
        self.check_references(tenant_id, &entity).await?;

        let created = self.repo.create(&entity).await?;
        info!(
            kind = E::KIND.as_str(),
            id = %created.id(),
            tenant_id = %tenant_id,
            "Entity created"
        );
        Ok(created)
    }

    pub async fn list(&self, tenant_id: &Uuid, query: &ListQuery) -> Result<Page<E>, DomainError> {
        E::check_query(query)?;
        let sort = query.sort_field();
        if !E::SORT_FIELDS.contains(&sort) {
            return Err(DomainError::ValidationError(format!(
                "Cannot sort {} by '{}' (allowed: {})",
                E::KIND.collection(),
                sort,
                E::SORT_FIELDS.join(", ")
            )));
        }

        let page = self.repo.list(tenant_id, query).await?;
        debug!(
            kind = E::KIND.as_str(),
            tenant_id = %tenant_id,
            returned = page.data.len(),
            total = page.total,
            "Entities listed"
        );
        Ok(page)
    }

    pub async fn get(&self, tenant_id: &Uuid, id: &Uuid) -> Result<E, DomainError> {
        self.repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or(DomainError::NotFound { kind: E::KIND.as_str(), id: *id })
    }

    pub async fn update(&self, tenant_id: &Uuid, id: &Uuid, patch: E::Patch) -> Result<E, DomainError> {
        let mut entity = self.get(tenant_id, id).await?;
        entity.apply(patch)?;
        self.check_references(tenant_id, &entity).await?;

        let updated = self
            .repo
            .update(&entity)
            .await?
            .ok_or(DomainError::NotFound { kind: E::KIND.as_str(), id: *id })?;
        info!(kind = E::KIND.as_str(), id = %id, tenant_id = %tenant_id, "Entity updated");
        Ok(updated)
    }

    pub async fn delete(&self, tenant_id: &Uuid, id: &Uuid) -> Result<(), DomainError> {
        if !self.repo.delete(tenant_id, id).await? {
            return Err(DomainError::NotFound { kind: E::KIND.as_str(), id: *id });
        }
        info!(kind = E::KIND.as_str(), id = %id, tenant_id = %tenant_id, "Entity deleted");
        Ok(())
    }

    async fn check_references(&self, tenant_id: &Uuid, entity: &E) -> Result<(), DomainError> {
        for (kind, id) in entity.references() {
            if !self.references.exists(tenant_id, kind, &id).await? {
                warn!(
                    kind = E::KIND.as_str(),
                    reference = kind.as_str(),
                    reference_id = %id,
                    tenant_id = %tenant_id,
                    "Rejected reference outside tenant"
                );
                return Err(DomainError::InvalidReference { kind: kind.as_str(), id });
            }
        }
        Ok(())
    }
}
