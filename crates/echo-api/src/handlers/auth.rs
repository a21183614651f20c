// ============================================================================
// Echo API - Auth Handlers
// File: crates/echo-api/src/handlers/auth.rs
// ============================================================================
//! Authentication HTTP handlers (register, login, password flows)

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use echo_core::services::{AuthService, AuthSession, RegisterInput, TenantInfo, UserInfo};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ApiError;
use crate::extract::{ApiJson, AuthUser};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Register request payload
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(alias = "display_name")]
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub company: Option<String>,
}

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[serde(alias = "password")]
    pub new_password: String,
}

/// Current user response
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserInfo,
    pub tenant: TenantInfo,
}

/// Forgot-password response. `reset_token` is only filled in development.
#[derive(Debug, Serialize)]
pub struct ForgotPasswordResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
}

const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account exists for that email, a reset link has been issued";

/// Register handler - POST /auth/register
pub async fn register(
    State(auth): State<Arc<AuthService>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthSession>>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Name is required"));
    }

    let session = auth
        .register(RegisterInput {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            company: payload.company,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(session, "Registration successful")),
    ))
}

/// Login handler - POST /auth/login
pub async fn login(
    State(auth): State<Arc<AuthService>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthSession>>, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "Email and password are required",
        ));
    }

    let session = auth.login(&payload.email, &payload.password).await?;
    Ok(Json(ApiResponse::success(session)))
}

/// Refresh handler - POST /auth/refresh
pub async fn refresh(
    State(auth): State<Arc<AuthService>>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> Result<Json<ApiResponse<AuthSession>>, ApiError> {
    let session = auth.refresh(&payload.refresh_token).await?;
    Ok(Json(ApiResponse::success(session)))
}

/// Current user - GET /auth/me
pub async fn me(
    State(auth): State<Arc<AuthService>>,
    user: AuthUser,
) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    let (user, tenant) = auth.me(&user.user_id).await?;
    Ok(Json(ApiResponse::success(MeResponse { user, tenant })))
}

/// POST /auth/change-password
pub async fn change_password(
    State(auth): State<Arc<AuthService>>,
    user: AuthUser,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    auth.change_password(&user.user_id, &payload.current_password, &payload.new_password)
        .await?;
    Ok(Json(ApiResponse::success_with_message((), "Password changed")))
}

/// POST /auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<ForgotPasswordResponse>>, ApiError> {
    let token = state.auth.forgot_password(&payload.email).await?;

    let reset_token = token.filter(|_| state.config.app.is_development());
    Ok(Json(ApiResponse::success_with_message(
        ForgotPasswordResponse { reset_token },
        FORGOT_PASSWORD_MESSAGE,
    )))
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(auth): State<Arc<AuthService>>,
    ApiJson(payload): ApiJson<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    auth.reset_password(&payload.token, &payload.new_password).await?;
    Ok(Json(ApiResponse::success_with_message((), "Password has been reset")))
}

/// Global quota for every `/auth/*` request.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if state.auth_limiter.check().is_err() {
        warn!(path = %request.uri().path(), "Auth rate limit exceeded");
        return ApiError::too_many_requests("Too many authentication requests, try again later")
            .into_response();
    }
    next.run(request).await
}
