//! The contract every tenant-scoped CRUD entity implements.

use std::fmt::Debug;

use echo_shared::{EntityId, TenantId};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::domain::query::ListQuery;
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Goal,
    Initiative,
    Customer,
    Feedback,
    Idea,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Goal => "goal",
            EntityKind::Initiative => "initiative",
            EntityKind::Customer => "customer",
            EntityKind::Feedback => "feedback",
            EntityKind::Idea => "idea",
        }
    }

    /// Collection name used for routes and table names.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Goal => "goals",
            EntityKind::Initiative => "initiatives",
            EntityKind::Customer => "customers",
            EntityKind::Feedback => "feedback",
            EntityKind::Idea => "ideas",
        }
    }
}

/// A row owned by exactly one tenant, creatable from `Create` input and
/// partially updatable from a `Patch`.
pub trait TenantEntity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Columns accepted by `?sort=`. The first entry is not the default;
    /// unsorted listings fall back to `created_at`.
    const SORT_FIELDS: &'static [&'static str];

    type Create: DeserializeOwned + Send + 'static;
    type Patch: DeserializeOwned + Send + 'static;

    fn create(tenant_id: TenantId, input: Self::Create) -> Result<Self, DomainError>;

    /// Applies only the fields present in `patch`, then re-validates.
    fn apply(&mut self, patch: Self::Patch) -> Result<(), DomainError>;

    fn id(&self) -> EntityId;

    fn tenant_id(&self) -> TenantId;

    /// Foreign keys that must resolve inside the same tenant.
    fn references(&self) -> Vec<(EntityKind, EntityId)> {
        Vec::new()
    }

    /// Rejects filter values this entity cannot match (unknown status, ...).
    fn check_query(query: &ListQuery) -> Result<(), DomainError> {
        let _ = query;
        Ok(())
    }
}
