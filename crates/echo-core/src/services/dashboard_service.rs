//! Per-tenant overview

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::domain::{DashboardSummary, GoalStatus, IdeaStatus, InitiativeStatus, Sentiment, StatusCounts};
use crate::error::DomainError;
use crate::repositories::DashboardRepository;

const RECENT_FEEDBACK_LIMIT: u32 = 5;

pub struct DashboardService {
    repo: Arc<dyn DashboardRepository>,
}

impl DashboardService {
    pub fn new(repo: Arc<dyn DashboardRepository>) -> Self {
        Self { repo }
    }

    /// Every known label appears in the counts, zero when no rows carry it.
    pub async fn summary(&self, tenant_id: &Uuid) -> Result<DashboardSummary, DomainError> {
        let mut summary = self.repo.summary(tenant_id, RECENT_FEEDBACK_LIMIT).await?;

        fill(&mut summary.goals_by_status, GoalStatus::ALL.iter().map(|s| s.as_str()));
        fill(
            &mut summary.initiatives_by_status,
            InitiativeStatus::ALL.iter().map(|s| s.as_str()),
        );
        fill(&mut summary.ideas_by_status, IdeaStatus::ALL.iter().map(|s| s.as_str()));
        fill(
            &mut summary.feedback_by_sentiment,
            Sentiment::ALL.iter().map(|s| s.as_str()),
        );

        debug!(
            tenant_id = %tenant_id,
            goals = DashboardSummary::total(&summary.goals_by_status),
            ideas = DashboardSummary::total(&summary.ideas_by_status),
            "Dashboard summary built"
        );
        Ok(summary)
    }
}

fn fill<'a>(counts: &mut StatusCounts, labels: impl Iterator<Item = &'a str>) {
    for label in labels {
        counts.entry(label.to_string()).or_insert(0);
    }
}
