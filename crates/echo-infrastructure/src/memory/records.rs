//! Per-entity table access, filtering and ordering for the memory store.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use echo_core::domain::{Customer, Feedback, Goal, Idea, Initiative, ListQuery, TenantEntity};

use super::Tables;

/// Comparable value of one sort column. `Missing` stands for SQL NULL.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum SortKey {
    Missing,
    Int(i64),
    Text(String),
    Date(NaiveDate),
    Time(DateTime<Utc>),
}

impl From<Option<DateTime<Utc>>> for SortKey {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map(SortKey::Time).unwrap_or(SortKey::Missing)
    }
}

fn text(value: &str) -> SortKey {
    SortKey::Text(value.to_lowercase())
}

/// Case-insensitive match of a stored label against an optional filter.
fn label_matches(label: &str, wanted: &Option<String>) -> bool {
    wanted
        .as_deref()
        .map_or(true, |wanted| wanted.trim().eq_ignore_ascii_case(label))
}

fn id_matches(value: Option<Uuid>, wanted: Option<Uuid>) -> bool {
    wanted.map_or(true, |wanted| value == Some(wanted))
}

pub(crate) trait MemoryRecord: TenantEntity {
    fn table(tables: &Tables) -> &HashMap<Uuid, Self>;
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self>;

    /// Filters other than `search`.
    fn matches(&self, query: &ListQuery) -> bool;
    fn search_text(&self) -> Vec<&str>;
    fn sort_key(&self, field: &str) -> SortKey;

    /// Copy with derived fields filled in.
    fn hydrated(&self, tables: &Tables) -> Self {
        let _ = tables;
        self.clone()
    }

    /// Clears references to a deleted row, like `ON DELETE SET NULL`.
    fn detach(tables: &mut Tables, id: &Uuid) {
        let _ = (tables, id);
    }
}

impl MemoryRecord for Goal {
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.goals
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.goals
    }

    fn matches(&self, query: &ListQuery) -> bool {
        label_matches(self.status.as_str(), &query.status)
    }

    fn search_text(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_deref().unwrap_or_default()]
    }

    fn sort_key(&self, field: &str) -> SortKey {
        match field {
            "title" => text(&self.title),
            "status" => text(self.status.as_str()),
            "target_date" => self.target_date.map(SortKey::Date).unwrap_or(SortKey::Missing),
            "modified_at" => self.modified_at.into(),
            _ => SortKey::Time(self.created_at),
        }
    }

    fn detach(tables: &mut Tables, id: &Uuid) {
        for initiative in tables.initiatives.values_mut() {
            if initiative.goal_id == Some(*id) {
                initiative.goal_id = None;
            }
        }
    }
}

impl MemoryRecord for Initiative {
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.initiatives
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.initiatives
    }

    fn matches(&self, query: &ListQuery) -> bool {
        label_matches(self.status.as_str(), &query.status) && id_matches(self.goal_id, query.goal_id)
    }

    fn search_text(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_deref().unwrap_or_default()]
    }

    fn sort_key(&self, field: &str) -> SortKey {
        match field {
            "title" => text(&self.title),
            "status" => text(self.status.as_str()),
            "priority" => SortKey::Int(i64::from(self.priority)),
            "modified_at" => self.modified_at.into(),
            _ => SortKey::Time(self.created_at),
        }
    }

    fn detach(tables: &mut Tables, id: &Uuid) {
        for feedback in tables.feedback.values_mut() {
            if feedback.initiative_id == Some(*id) {
                feedback.initiative_id = None;
            }
        }
        for idea in tables.ideas.values_mut() {
            if idea.initiative_id == Some(*id) {
                idea.initiative_id = None;
            }
        }
    }
}

impl MemoryRecord for Customer {
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.customers
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.customers
    }

    fn matches(&self, query: &ListQuery) -> bool {
        label_matches(self.status.as_str(), &query.status)
    }

    fn search_text(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.revenue.as_deref().unwrap_or_default()]
    }

    fn sort_key(&self, field: &str) -> SortKey {
        match field {
            "name" => text(&self.name),
            "status" => text(self.status.as_str()),
            "idea_count" => SortKey::Int(self.idea_count),
            "feedback_count" => SortKey::Int(self.feedback_count),
            "modified_at" => self.modified_at.into(),
            _ => SortKey::Time(self.created_at),
        }
    }

    fn hydrated(&self, tables: &Tables) -> Self {
        let mut customer = self.clone();
        customer.idea_count = tables
            .ideas
            .values()
            .filter(|idea| idea.customer_ids.contains(&self.id))
            .count() as i64;
        customer.feedback_count = tables
            .feedback
            .values()
            .filter(|feedback| feedback.customer_id == Some(self.id))
            .count() as i64;
        customer
    }

    fn detach(tables: &mut Tables, id: &Uuid) {
        for feedback in tables.feedback.values_mut() {
            if feedback.customer_id == Some(*id) {
                feedback.customer_id = None;
            }
        }
        for idea in tables.ideas.values_mut() {
            idea.customer_ids.retain(|customer_id| customer_id != id);
        }
    }
}

impl MemoryRecord for Feedback {
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.feedback
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.feedback
    }

    fn matches(&self, query: &ListQuery) -> bool {
        label_matches(self.sentiment.as_str(), &query.sentiment)
            && id_matches(self.customer_id, query.customer_id)
            && id_matches(self.initiative_id, query.initiative_id)
    }

    fn search_text(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_deref().unwrap_or_default()]
    }

    fn sort_key(&self, field: &str) -> SortKey {
        match field {
            "title" => text(&self.title),
            "sentiment" => text(self.sentiment.as_str()),
            "modified_at" => self.modified_at.into(),
            _ => SortKey::Time(self.created_at),
        }
    }
}

impl MemoryRecord for Idea {
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.ideas
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.ideas
    }

    fn matches(&self, query: &ListQuery) -> bool {
        label_matches(self.status.as_str(), &query.status)
            && label_matches(self.priority.as_str(), &query.priority)
            && id_matches(self.initiative_id, query.initiative_id)
            && query
                .customer_id
                .map_or(true, |customer_id| self.customer_ids.contains(&customer_id))
    }

    fn search_text(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_deref().unwrap_or_default()]
    }

    fn sort_key(&self, field: &str) -> SortKey {
        match field {
            "title" => text(&self.title),
            // Importance, so descending lists urgent ideas first
            "priority" => SortKey::Int(3 - i64::from(self.priority.rank())),
            "effort" => SortKey::Int(
                echo_core::domain::IdeaEffort::ALL
                    .iter()
                    .position(|e| *e == self.effort)
                    .unwrap_or_default() as i64,
            ),
            "status" => text(self.status.as_str()),
            "modified_at" => self.modified_at.into(),
            _ => SortKey::Time(self.created_at),
        }
    }
}
