// ============================================================================
// Echo Core - Initiative Entity
// File: crates/echo-core/src/domain/initiative.rs
// Description: Unit of planned work, optionally under a goal
// ============================================================================

use chrono::{DateTime, Utc};
use echo_shared::{EntityId, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::entity::{EntityKind, TenantEntity};
use crate::domain::patch::{blank_as_none, clean_text, nullable, nullable_blank};
use crate::domain::query::ListQuery;
use crate::error::DomainError;

labeled_enum! {
    pub enum InitiativeStatus("initiative status") {
        Active => "active",
        Planned => "planned",
        Completed => "completed",
        OnHold => "on_hold",
    }
    default = Planned;
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Initiative {
    pub id: Uuid,
    pub tenant_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description too long"))]
    pub description: Option<String>,

    pub status: InitiativeStatus,

    /// Rank, lower is more important.
    #[validate(range(min = 0, max = 10000, message = "Priority must be between 0 and 10000"))]
    pub priority: i32,

    pub goal_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct NewInitiative {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<InitiativeStatus>,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub goal_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InitiativePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<InitiativeStatus>,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default, deserialize_with = "nullable_blank")]
    pub goal_id: Option<Option<Uuid>>,
}

impl TenantEntity for Initiative {
    const KIND: EntityKind = EntityKind::Initiative;
    const SORT_FIELDS: &'static [&'static str] =
        &["title", "status", "priority", "created_at", "modified_at"];

    type Create = NewInitiative;
    type Patch = InitiativePatch;

    fn create(tenant_id: TenantId, input: NewInitiative) -> Result<Self, DomainError> {
        let initiative = Self {
            id: Uuid::new_v4(),
            tenant_id,
            title: input.title.trim().to_string(),
            description: clean_text(input.description),
            status: input.status.unwrap_or_default(),
            priority: input.priority.unwrap_or(0),
            goal_id: input.goal_id,
            created_at: Utc::now(),
            modified_at: None,
        };

        initiative.validate()?;
        Ok(initiative)
    }

    fn apply(&mut self, patch: InitiativePatch) -> Result<(), DomainError> {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = clean_text(description);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(goal_id) = patch.goal_id {
            self.goal_id = goal_id;
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

    fn references(&self) -> Vec<(EntityKind, EntityId)> {
        self.goal_id
            .map(|goal_id| (EntityKind::Goal, goal_id))
            .into_iter()
            .collect()
    }

    fn check_query(query: &ListQuery) -> Result<(), DomainError> {
        if let Some(status) = &query.status {
            InitiativeStatus::parse(status)?;
        }
        Ok(())
    }
}
