//! Per-tenant overview backing the home page.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::feedback::Feedback;

/// Label → row count.
pub type StatusCounts = BTreeMap<String, u64>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub goals_by_status: StatusCounts,
    pub initiatives_by_status: StatusCounts,
    pub ideas_by_status: StatusCounts,
    pub feedback_by_sentiment: StatusCounts,
    pub customer_count: u64,
    pub recent_feedback: Vec<Feedback>,
}

impl DashboardSummary {
    pub fn total(counts: &StatusCounts) -> u64 {
        counts.values().sum()
    }
}
