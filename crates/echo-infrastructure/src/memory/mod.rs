//! In-memory storage backend.
//!
//! Mirrors the Postgres adapters closely enough for development and for
//! router tests: tenant filtering, reference nulling on delete, derived
//! customer counts and unique email/slug constraints.

mod accounts;
mod records;

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use echo_core::domain::{
    Customer, DashboardSummary, EntityKind, Feedback, Goal, Idea, Initiative, ListQuery, PasswordReset,
    SortOrder, StatusCounts, Tenant, User,
};
use echo_core::error::DomainError;
use echo_core::repositories::{DashboardRepository, ReferenceChecker, StoreHealth, TenantScopedRepository};
use echo_shared::types::Page;

pub(crate) use records::{MemoryRecord, SortKey};

#[derive(Default)]
pub(crate) struct Tables {
    pub tenants: HashMap<Uuid, Tenant>,
    pub users: HashMap<Uuid, User>,
    pub password_resets: HashMap<Uuid, PasswordReset>,
    pub goals: HashMap<Uuid, Goal>,
    pub initiatives: HashMap<Uuid, Initiative>,
    pub customers: HashMap<Uuid, Customer>,
    pub feedback: HashMap<Uuid, Feedback>,
    pub ideas: HashMap<Uuid, Idea>,
}

/// Every table behind one lock.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn row_exists(tables: &Tables, tenant_id: &Uuid, kind: EntityKind, id: &Uuid) -> bool {
        match kind {
            EntityKind::Goal => owned(&tables.goals, tenant_id, id, |r| r.tenant_id),
            EntityKind::Initiative => owned(&tables.initiatives, tenant_id, id, |r| r.tenant_id),
            EntityKind::Customer => owned(&tables.customers, tenant_id, id, |r| r.tenant_id),
            EntityKind::Feedback => owned(&tables.feedback, tenant_id, id, |r| r.tenant_id),
            EntityKind::Idea => owned(&tables.ideas, tenant_id, id, |r| r.tenant_id),
        }
    }
}

fn owned<R>(table: &HashMap<Uuid, R>, tenant_id: &Uuid, id: &Uuid, tenant_of: impl Fn(&R) -> Uuid) -> bool {
    table.get(id).is_some_and(|row| tenant_of(row) == *tenant_id)
}

/// Missing keys sort last in both directions, like `NULLS LAST`.
fn compare(a: &SortKey, b: &SortKey, order: SortOrder) -> Ordering {
    match (a, b) {
        (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
        (SortKey::Missing, _) => Ordering::Greater,
        (_, SortKey::Missing) => Ordering::Less,
        _ => match order {
            SortOrder::Asc => a.cmp(b),
            SortOrder::Desc => b.cmp(a),
        },
    }
}

#[async_trait]
impl<E: MemoryRecord> TenantScopedRepository<E> for MemoryStore {
    async fn find_by_id(&self, tenant_id: &Uuid, id: &Uuid) -> Result<Option<E>, DomainError> {
        let tables = self.tables.read();
        Ok(E::table(&tables)
            .get(id)
            .filter(|row| row.tenant_id() == *tenant_id)
            .map(|row| row.hydrated(&tables)))
    }

    async fn list(&self, tenant_id: &Uuid, query: &ListQuery) -> Result<Page<E>, DomainError> {
        let needle = query.search_term();
        let field = query.sort_field();

        let tables = self.tables.read();
        let mut rows: Vec<(SortKey, E)> = E::table(&tables)
            .values()
            .filter(|row| row.tenant_id() == *tenant_id)
            .map(|row| row.hydrated(&tables))
            .filter(|row| row.matches(query))
            .filter(|row| match &needle {
                Some(needle) => row
                    .search_text()
                    .iter()
                    .any(|text| text.to_lowercase().contains(needle.as_str())),
                None => true,
            })
            .map(|row| (row.sort_key(field), row))
            .collect();
        drop(tables);

        rows.sort_by(|(ka, a), (kb, b)| {
            compare(ka, kb, query.order).then_with(|| match query.order {
                SortOrder::Asc => a.id().cmp(&b.id()),
                SortOrder::Desc => b.id().cmp(&a.id()),
            })
        });

        let pagination = query.pagination();
        let total = rows.len() as u64;
        let data = rows
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .map(|(_, row)| row)
            .collect();

        Ok(Page::new(data, total, pagination))
    }

    async fn create(&self, entity: &E) -> Result<E, DomainError> {
        let mut tables = self.tables.write();
        let table = E::table_mut(&mut tables);
        if table.contains_key(&entity.id()) {
            return Err(DomainError::DatabaseError(format!(
                "duplicate {} id {}",
                E::KIND.as_str(),
                entity.id()
            )));
        }
        table.insert(entity.id(), entity.clone());
        debug!(kind = E::KIND.as_str(), id = %entity.id(), "Stored in memory");
        Ok(entity.hydrated(&tables))
    }

    async fn update(&self, entity: &E) -> Result<Option<E>, DomainError> {
        let mut tables = self.tables.write();
        let table = E::table_mut(&mut tables);
        match table.get_mut(&entity.id()) {
            Some(row) if row.tenant_id() == entity.tenant_id() => *row = entity.clone(),
            _ => return Ok(None),
        }
        Ok(Some(entity.hydrated(&tables)))
    }

    async fn delete(&self, tenant_id: &Uuid, id: &Uuid) -> Result<bool, DomainError> {
        let mut tables = self.tables.write();
        let table = E::table_mut(&mut tables);
        if !table.get(id).is_some_and(|row| row.tenant_id() == *tenant_id) {
            return Ok(false);
        }
        table.remove(id);
        E::detach(&mut tables, id);
        Ok(true)
    }
}

#[async_trait]
impl ReferenceChecker for MemoryStore {
    async fn exists(&self, tenant_id: &Uuid, kind: EntityKind, id: &Uuid) -> Result<bool, DomainError> {
        Ok(Self::row_exists(&self.tables.read(), tenant_id, kind, id))
    }
}

#[async_trait]
impl DashboardRepository for MemoryStore {
    async fn summary(&self, tenant_id: &Uuid, recent_limit: u32) -> Result<DashboardSummary, DomainError> {
        fn count<'a, R: 'a>(
            rows: impl Iterator<Item = &'a R>,
            tenant_id: &Uuid,
            tenant_of: impl Fn(&R) -> Uuid,
            label_of: impl Fn(&R) -> &'static str,
        ) -> StatusCounts {
            let mut counts = StatusCounts::new();
            for row in rows.filter(|r| tenant_of(r) == *tenant_id) {
                *counts.entry(label_of(row).to_string()).or_insert(0) += 1;
            }
            counts
        }

        let tables = self.tables.read();

        let mut recent_feedback: Vec<Feedback> = tables
            .feedback
            .values()
            .filter(|f| f.tenant_id == *tenant_id)
            .cloned()
            .collect();
        recent_feedback.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        recent_feedback.truncate(recent_limit as usize);

        Ok(DashboardSummary {
            goals_by_status: count(
                tables.goals.values(),
                tenant_id,
                |g: &Goal| g.tenant_id,
                |g: &Goal| g.status.as_str(),
            ),
            initiatives_by_status: count(
                tables.initiatives.values(),
                tenant_id,
                |i: &Initiative| i.tenant_id,
                |i: &Initiative| i.status.as_str(),
            ),
            ideas_by_status: count(
                tables.ideas.values(),
                tenant_id,
                |i: &Idea| i.tenant_id,
                |i: &Idea| i.status.as_str(),
            ),
            feedback_by_sentiment: count(
                tables.feedback.values(),
                tenant_id,
                |f: &Feedback| f.tenant_id,
                |f: &Feedback| f.sentiment.as_str(),
            ),
            customer_count: tables.customers.values().filter(|c| c.tenant_id == *tenant_id).count() as u64,
            recent_feedback,
        })
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echo_core::domain::{NewCustomer, NewGoal, NewIdea, NewInitiative, TenantEntity};
    use std::sync::Arc;

    fn goal(tenant_id: Uuid, title: &str) -> Goal {
        Goal::create(
            tenant_id,
            NewGoal {
                title: title.to_string(),
                description: None,
                status: None,
                target_date: None,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_tenant_isolation() {
        let store = MemoryStore::new();
        let tenant_a = Uuid::new_v4();
        let tenant_b = Uuid::new_v4();

        let mine = TenantScopedRepository::<Goal>::create(&store, &goal(tenant_a, "Mine")).await.unwrap();
        TenantScopedRepository::<Goal>::create(&store, &goal(tenant_b, "Theirs")).await.unwrap();

        let page: Page<Goal> = store.list(&tenant_a, &ListQuery::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].title, "Mine");

        let other = TenantScopedRepository::<Goal>::find_by_id(&store, &tenant_b, &mine.id).await.unwrap();
        assert!(other.is_none());
        let deleted = TenantScopedRepository::<Goal>::delete(&store, &tenant_b, &mine.id).await.unwrap();
        assert!(!deleted);
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_ids() {
        let store = Arc::new(MemoryStore::new());
        let tenant_id = Uuid::new_v4();

        let handles: Vec<_> = (0..32)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move {
                    TenantScopedRepository::<Goal>::create(store.as_ref(), &goal(tenant_id, &format!("Goal {n}")))
                        .await
                        .map(|g| g.id)
                })
            })
            .collect();

        let mut ids = std::collections::HashSet::new();
        for handle in futures::future::join_all(handles).await {
            ids.insert(handle.unwrap().unwrap());
        }
        assert_eq!(ids.len(), 32);

        let query = ListQuery {
            per_page: Some(100),
            ..Default::default()
        };
        let page: Page<Goal> = store.list(&tenant_id, &query).await.unwrap();
        assert_eq!(page.total, 32);
    }

    #[tokio::test]
    async fn test_sort_search_and_paging() {
        let store = MemoryStore::new();
        let tenant_id = Uuid::new_v4();
        for title in ["Bravo", "alpha", "Charlie launch", "delta launch"] {
            TenantScopedRepository::<Goal>::create(&store, &goal(tenant_id, title)).await.unwrap();
        }

        let query = ListQuery {
            sort: Some("title".to_string()),
            order: SortOrder::Asc,
            per_page: Some(2),
            page: Some(1),
            ..Default::default()
        };
        let page: Page<Goal> = store.list(&tenant_id, &query).await.unwrap();
        let titles: Vec<_> = page.data.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["alpha", "Bravo"]);
        assert_eq!(page.total, 4);

        let query = ListQuery {
            search: Some("LAUNCH".to_string()),
            ..Default::default()
        };
        let page: Page<Goal> = store.list(&tenant_id, &query).await.unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_customer_counts_and_delete_detaches() {
        let store = MemoryStore::new();
        let tenant_id = Uuid::new_v4();

        let customer = Customer::create(
            tenant_id,
            NewCustomer {
                name: "Globex".to_string(),
                status: None,
                revenue: None,
            },
        )
        .unwrap();
        TenantScopedRepository::<Customer>::create(&store, &customer).await.unwrap();

        let initiative = Initiative::create(
            tenant_id,
            NewInitiative {
                title: "Self-serve".to_string(),
                description: None,
                status: None,
                priority: None,
                goal_id: None,
            },
        )
        .unwrap();
        TenantScopedRepository::<Initiative>::create(&store, &initiative).await.unwrap();

        let idea = Idea::create(
            tenant_id,
            NewIdea {
                title: "Single sign-on".to_string(),
                description: None,
                priority: None,
                effort: None,
                status: None,
                customer_ids: vec![customer.id],
                initiative_id: Some(initiative.id),
            },
        )
        .unwrap();
        TenantScopedRepository::<Idea>::create(&store, &idea).await.unwrap();

        let loaded = TenantScopedRepository::<Customer>::find_by_id(&store, &tenant_id, &customer.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.idea_count, 1);
        assert_eq!(loaded.feedback_count, 0);

        TenantScopedRepository::<Customer>::delete(&store, &tenant_id, &customer.id).await.unwrap();
        TenantScopedRepository::<Initiative>::delete(&store, &tenant_id, &initiative.id).await.unwrap();

        let idea = TenantScopedRepository::<Idea>::find_by_id(&store, &tenant_id, &idea.id)
            .await
            .unwrap()
            .unwrap();
        assert!(idea.customer_ids.is_empty());
        assert!(idea.initiative_id.is_none());
    }

    #[tokio::test]
    async fn test_reference_checker_respects_tenant() {
        let store = MemoryStore::new();
        let tenant_id = Uuid::new_v4();
        let g = TenantScopedRepository::<Goal>::create(&store, &goal(tenant_id, "Owned")).await.unwrap();

        assert!(store.exists(&tenant_id, EntityKind::Goal, &g.id).await.unwrap());
        assert!(!store.exists(&Uuid::new_v4(), EntityKind::Goal, &g.id).await.unwrap());
        assert!(!store.exists(&tenant_id, EntityKind::Initiative, &g.id).await.unwrap());
    }
}
