//! Shared application state

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::extract::FromRef;
use echo_core::domain::{Customer, Feedback, Goal, Idea, Initiative};
use echo_core::repositories::Repositories;
use echo_core::services::{AuthService, CrudService, DashboardService};
use echo_security::JwtService;
use echo_shared::config::AppConfig;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repos: Repositories,
    pub auth: Arc<AuthService>,
    pub dashboard: Arc<DashboardService>,
    pub goals: Arc<CrudService<Goal>>,
    pub initiatives: Arc<CrudService<Initiative>>,
    pub customers: Arc<CrudService<Customer>>,
    pub feedback: Arc<CrudService<Feedback>>,
    pub ideas: Arc<CrudService<Idea>>,
    /// Global quota shared by every `/auth/*` request.
    pub auth_limiter: Arc<DefaultDirectRateLimiter>,
}

impl AppState {
    pub fn new(config: AppConfig, repos: Repositories) -> Self {
        let jwt = Arc::new(JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry,
            config.jwt.refresh_token_expiry,
        ));

        let auth = Arc::new(AuthService::new(
            repos.users.clone(),
            repos.tenants.clone(),
            repos.password_resets.clone(),
            jwt,
            config.auth.reset_token_ttl_seconds,
        ));

        let per_minute = NonZeroU32::new(config.auth.rate_limit_per_minute).unwrap_or(NonZeroU32::MIN);
        let auth_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));

        Self {
            dashboard: Arc::new(DashboardService::new(repos.dashboard.clone())),
            goals: Arc::new(CrudService::new(repos.goals.clone(), repos.references.clone())),
            initiatives: Arc::new(CrudService::new(repos.initiatives.clone(), repos.references.clone())),
            customers: Arc::new(CrudService::new(repos.customers.clone(), repos.references.clone())),
            feedback: Arc::new(CrudService::new(repos.feedback.clone(), repos.references.clone())),
            ideas: Arc::new(CrudService::new(repos.ideas.clone(), repos.references.clone())),
            config: Arc::new(config),
            repos,
            auth,
            auth_limiter,
        }
    }
}

macro_rules! crud_state {
    ($($entity:ty => $field:ident),+ $(,)?) => {
        $(
            impl FromRef<AppState> for Arc<CrudService<$entity>> {
                fn from_ref(state: &AppState) -> Self {
                    state.$field.clone()
                }
            }
        )+
    };
}

crud_state! {
    Goal => goals,
    Initiative => initiatives,
    Customer => customers,
    Feedback => feedback,
    Idea => ideas,
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for Arc<DashboardService> {
    fn from_ref(state: &AppState) -> Self {
        state.dashboard.clone()
    }
}
