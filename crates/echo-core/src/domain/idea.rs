// ============================================================================
// Echo Core - Idea Entity
// File: crates/echo-core/src/domain/idea.rs
// Description: Product idea linked to customers and an initiative
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
    pub enum IdeaPriority("idea priority") {
        Urgent => "urgent",
        High => "high",
        Medium => "medium",
        Low => "low",
    }
    default = Medium;
}

impl IdeaPriority {
    /// Sort rank, most urgent first.
    pub fn rank(&self) -> i32 {
        match self {
            IdeaPriority::Urgent => 0,
            IdeaPriority::High => 1,
            IdeaPriority::Medium => 2,
            IdeaPriority::Low => 3,
        }
    }
}

labeled_enum! {
    /// T-shirt size estimate
    pub enum IdeaEffort("idea effort") {
        ExtraSmall => "xs",
        Small => "s",
        Medium => "m",
        Large => "l",
        ExtraLarge => "xl",
    }
    default = Medium;
}

labeled_enum! {
    pub enum IdeaStatus("idea status") {
        New => "new",
        Planned => "planned",
        InProgress => "in_progress",
        Completed => "completed",
        Rejected => "rejected",
    }
    default = New;
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Idea {
    pub id: Uuid,
    pub tenant_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[validate(length(max = 10000, message = "Description too long"))]
    pub description: Option<String>,

    pub priority: IdeaPriority,
    pub effort: IdeaEffort,
    pub status: IdeaStatus,

    /// Stored in the `idea_customers` join table.
    #[validate(length(max = 500, message = "Too many customers linked"))]
    #[serde(default)]
    pub customer_ids: Vec<Uuid>,
    pub initiative_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct NewIdea {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<IdeaPriority>,
    #[serde(default)]
    pub effort: Option<IdeaEffort>,
    #[serde(default)]
    pub status: Option<IdeaStatus>,
    #[serde(default)]
    pub customer_ids: Vec<Uuid>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub initiative_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IdeaPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub priority: Option<IdeaPriority>,
    #[serde(default)]
    pub effort: Option<IdeaEffort>,
    #[serde(default)]
    pub status: Option<IdeaStatus>,
    #[serde(default)]
    pub customer_ids: Option<Vec<Uuid>>,
    #[serde(default, deserialize_with = "nullable_blank")]
    pub initiative_id: Option<Option<Uuid>>,
}

/// Removes repeats while keeping first-seen order.
fn dedup_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

impl TenantEntity for Idea {
    const KIND: EntityKind = EntityKind::Idea;
    const SORT_FIELDS: &'static [&'static str] = &[
        "title",
        "priority",
        "effort",
        "status",
        "created_at",
        "modified_at",
    ];

    type Create = NewIdea;
    type Patch = IdeaPatch;

    fn create(tenant_id: TenantId, input: NewIdea) -> Result<Self, DomainError> {
        let idea = Self {
            id: Uuid::new_v4(),
            tenant_id,
            title: input.title.trim().to_string(),
            description: clean_text(input.description),
            priority: input.priority.unwrap_or_default(),
            effort: input.effort.unwrap_or_default(),
            status: input.status.unwrap_or_default(),
            customer_ids: dedup_ids(input.customer_ids),
            initiative_id: input.initiative_id,
            created_at: Utc::now(),
            modified_at: None,
        };

        idea.validate()?;
        Ok(idea)
    }

    fn apply(&mut self, patch: IdeaPatch) -> Result<(), DomainError> {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = clean_text(description);
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(effort) = patch.effort {
            self.effort = effort;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(customer_ids) = patch.customer_ids {
            self.customer_ids = dedup_ids(customer_ids);
        }
        if let Some(initiative_id) = patch.initiative_id {
            self.initiative_id = initiative_id;
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
        let mut refs: Vec<(EntityKind, EntityId)> = self
            .customer_ids
            .iter()
            .map(|id| (EntityKind::Customer, *id))
            .collect();
        if let Some(initiative_id) = self.initiative_id {
            refs.push((EntityKind::Initiative, initiative_id));
        }
        refs
    }

    fn check_query(query: &ListQuery) -> Result<(), DomainError> {
        if let Some(status) = &query.status {
            IdeaStatus::parse(status)?;
        }
        if let Some(priority) = &query.priority {
            IdeaPriority::parse(priority)?;
        }
        Ok(())
    }
}
