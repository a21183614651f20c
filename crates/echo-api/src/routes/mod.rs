//! Router assembly

pub mod crud;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use echo_core::domain::{Customer, Feedback, Goal, Idea, Initiative};
use echo_shared::config::CorsSettings;
use echo_shared::constants::TENANT_HEADER;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::warn;

use crate::error::{expose_error_details, ApiError};
use crate::handlers::{auth, dashboard, health};
use crate::state::AppState;

pub use crud::crud_routes;

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Full application router. Every route is served under `/api` and at the
/// root path.
pub fn build_router(state: AppState) -> Router {
    let api = api_routes(&state);

    let mut router = Router::new()
        .nest("/api", api.clone())
        .merge(api)
        .fallback(not_found);

    if state.config.app.is_development() {
        router = router.layer(middleware::map_response(expose_error_details));
    }

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer(&state.config.cors))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/goals", crud_routes::<Goal>())
        .nest("/initiatives", crud_routes::<Initiative>())
        .nest("/customers", crud_routes::<Customer>())
        .nest("/feedback", crud_routes::<Feedback>())
        .nest("/ideas", crud_routes::<Idea>())
        .route("/dashboard", get(dashboard::summary))
        .nest("/auth", auth_routes(state))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/me", get(auth::me))
        .route("/change-password", post(auth::change_password))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::rate_limit))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

/// `*` allows any origin without credentials; an explicit list allows
/// credentials (the `tenant_id` cookie) from those origins only.
fn cors_layer(settings: &CorsSettings) -> CorsLayer {
    if settings.allowed_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = settings
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(TENANT_HEADER),
        ])
        .allow_credentials(true)
}
