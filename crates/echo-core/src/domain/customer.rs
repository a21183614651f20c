// ============================================================================
// Echo Core - Customer Entity
// File: crates/echo-core/src/domain/customer.rs
// Description: Customer account that feedback and ideas are attributed to
// ============================================================================

use chrono::{DateTime, Utc};
use echo_shared::{EntityId, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::entity::{EntityKind, TenantEntity};
use crate::domain::patch::{clean_text, nullable};
use crate::domain::query::ListQuery;
use crate::error::DomainError;

labeled_enum! {
    pub enum CustomerStatus("customer status") {
        Active => "active",
        Inactive => "inactive",
    }
    default = Active;
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Customer {
    pub id: Uuid,
    pub tenant_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: String,

    pub status: CustomerStatus,

    /// Display string such as "$120k ARR"; never parsed.
    #[validate(length(max = 100, message = "Revenue too long"))]
    pub revenue: Option<String>,

    /// Derived on read.
    #[serde(default)]
    pub idea_count: i64,
    /// Derived on read.
    #[serde(default)]
    pub feedback_count: i64,

    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    #[serde(default)]
    pub status: Option<CustomerStatus>,
    #[serde(default)]
    pub revenue: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<CustomerStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub revenue: Option<Option<String>>,
}

impl TenantEntity for Customer {
    const KIND: EntityKind = EntityKind::Customer;
    const SORT_FIELDS: &'static [&'static str] = &[
        "name",
        "status",
        "idea_count",
        "feedback_count",
        "created_at",
        "modified_at",
    ];

    type Create = NewCustomer;
    type Patch = CustomerPatch;

    fn create(tenant_id: TenantId, input: NewCustomer) -> Result<Self, DomainError> {
        let customer = Self {
            id: Uuid::new_v4(),
            tenant_id,
            name: input.name.trim().to_string(),
            status: input.status.unwrap_or_default(),
            revenue: clean_text(input.revenue),
            idea_count: 0,
            feedback_count: 0,
            created_at: Utc::now(),
            modified_at: None,
        };

        customer.validate()?;
        Ok(customer)
    }

    fn apply(&mut self, patch: CustomerPatch) -> Result<(), DomainError> {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(revenue) = patch.revenue {
            self.revenue = clean_text(revenue);
        }
        self.modified_at = Some(Utc::now());

        self.validate()?;
        Ok(())
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    fn check_query(query: &ListQuery) -> Result<(), DomainError> {
        if let Some(status) = &query.status {
            CustomerStatus::parse(status)?;
        }
        Ok(())
    }
}
