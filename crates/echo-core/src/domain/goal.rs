// ============================================================================
// Echo Core - Goal Entity
// File: crates/echo-core/src/domain/goal.rs
// Description: Business goal that initiatives roll up to
// ============================================================================

use chrono::{DateTime, NaiveDate, Utc};
use echo_shared::{EntityId, TenantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::entity::{EntityKind, TenantEntity};
use crate::domain::patch::{clean_text, flexible_date, nullable, nullable_date};
use crate::domain::query::ListQuery;
use crate::error::DomainError;

labeled_enum! {
    /// Goal lifecycle
    pub enum GoalStatus("goal status") {
        Active => "active",
        Planned => "planned",
        Completed => "completed",
    }
    default = Planned;
}

/// Goal entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Goal {
    pub id: Uuid,
    pub tenant_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description too long"))]
    pub description: Option<String>,

    pub status: GoalStatus,
    pub target_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct NewGoal {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<GoalStatus>,
    #[serde(default, deserialize_with = "flexible_date")]
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GoalPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub status: Option<GoalStatus>,
    #[serde(default, deserialize_with = "nullable_date")]
    pub target_date: Option<Option<NaiveDate>>,
}

impl TenantEntity for Goal {
    const KIND: EntityKind = EntityKind::Goal;
    const SORT_FIELDS: &'static [&'static str] =
        &["title", "status", "target_date", "created_at", "modified_at"];

    type Create = NewGoal;
    type Patch = GoalPatch;

    fn create(tenant_id: TenantId, input: NewGoal) -> Result<Self, DomainError> {
        let goal = Self {
            id: Uuid::new_v4(),
            tenant_id,
            title: input.title.trim().to_string(),
            description: clean_text(input.description),
            status: input.status.unwrap_or_default(),
            target_date: input.target_date,
            created_at: Utc::now(),
            modified_at: None,
        };

        goal.validate()?;
        Ok(goal)
    }

    fn apply(&mut self, patch: GoalPatch) -> Result<(), DomainError> {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = clean_text(description);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(target_date) = patch.target_date {
            self.target_date = target_date;
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
            GoalStatus::parse(status)?;
        }
        Ok(())
    }
}
