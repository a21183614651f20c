// ============================================================================
// Echo Core - Feedback Entity
// File: crates/echo-core/src/domain/feedback.rs
// Description: Customer feedback tagged with a sentiment
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
    pub enum Sentiment("sentiment") {
        Positive => "positive",
        Neutral => "neutral",
        Negative => "negative",
    }
    default = Neutral;
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Feedback {
    pub id: Uuid,
    pub tenant_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    /// Mirrors `title`; older clients read and write this name.
    #[serde(default)]
    pub content: String,

    #[validate(length(max = 10000, message = "Description too long"))]
    pub description: Option<String>,

    pub sentiment: Sentiment,
    pub customer_id: Option<Uuid>,
    pub initiative_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

/// Either `title` or `content` must be given; `title` wins when both are.
#[derive(Debug, Deserialize)]
pub struct NewFeedback {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub customer_id: Option<Uuid>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub initiative_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default, deserialize_with = "nullable_blank")]
    pub customer_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable_blank")]
    pub initiative_id: Option<Option<Uuid>>,
}

impl Feedback {
    fn set_title(&mut self, title: String) {
        self.content = title.clone();
        self.title = title;
    }
}

impl TenantEntity for Feedback {
    const KIND: EntityKind = EntityKind::Feedback;
    const SORT_FIELDS: &'static [&'static str] =
        &["title", "sentiment", "created_at", "modified_at"];

    type Create = NewFeedback;
    type Patch = FeedbackPatch;

    fn create(tenant_id: TenantId, input: NewFeedback) -> Result<Self, DomainError> {
        let title = clean_text(input.title)
            .or_else(|| clean_text(input.content))
            .ok_or_else(|| DomainError::ValidationError("Feedback requires a title or content".to_string()))?;

        let feedback = Self {
            id: Uuid::new_v4(),
            tenant_id,
            content: title.clone(),
            title,
            description: clean_text(input.description),
            sentiment: input.sentiment.unwrap_or_default(),
            customer_id: input.customer_id,
            initiative_id: input.initiative_id,
            created_at: Utc::now(),
            modified_at: None,
        };

        feedback.validate()?;
        Ok(feedback)
    }

    fn apply(&mut self, patch: FeedbackPatch) -> Result<(), DomainError> {
        if let Some(title) = patch.title.or(patch.content) {
            self.set_title(title.trim().to_string());
        }
        if let Some(description) = patch.description {
            self.description = clean_text(description);
        }
        if let Some(sentiment) = patch.sentiment {
            self.sentiment = sentiment;
        }
        if let Some(customer_id) = patch.customer_id {
            self.customer_id = customer_id;
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
        let mut refs = Vec::new();
        if let Some(customer_id) = self.customer_id {
            refs.push((EntityKind::Customer, customer_id));
        }
        if let Some(initiative_id) = self.initiative_id {
            refs.push((EntityKind::Initiative, initiative_id));
        }
        refs
    }

    fn check_query(query: &ListQuery) -> Result<(), DomainError> {
        if let Some(sentiment) = &query.sentiment {
            Sentiment::parse(sentiment)?;
        }
        Ok(())
    }
}
