//! Listing parameters shared by every collection.

use echo_shared::types::Pagination;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::patch::blank_as_none;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Query-string filters. Filters that do not apply to an entity are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub sentiment: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub goal_id: Option<Uuid>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub initiative_id: Option<Uuid>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub customer_id: Option<Uuid>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub search: Option<String>,
    #[serde(default, alias = "sort_by", deserialize_with = "blank_as_none")]
    pub sort: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub per_page: Option<u32>,
}

impl ListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }

    /// Lowercased search needle, if any.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn sort_field(&self) -> &str {
        self.sort.as_deref().unwrap_or("created_at")
    }
}
