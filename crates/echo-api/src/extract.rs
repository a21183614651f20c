// ============================================================================
// Echo API - Request Extractors
// File: crates/echo-api/src/extract.rs
// ============================================================================
//! Body, query and path extractors that reject with [`ApiError`], plus the
//! tenant and user resolution every protected route goes through.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query, Request,
    },
    http::{header, request::Parts, HeaderMap, StatusCode},
    Json,
};
use echo_shared::constants::{TENANT_COOKIE, TENANT_HEADER};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// `Json<T>` whose rejection is an [`ApiError`] (400, or 413 past the body limit).
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

/// Undeserializable bodies (unknown enum label, wrong type) are 400, not
/// axum's 422.
fn json_rejection(rejection: JsonRejection) -> ApiError {
    let status = match &rejection {
        JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => StatusCode::BAD_REQUEST,
        other => other.status(),
    };
    ApiError::new(status, "INVALID_BODY", rejection.body_text())
}

pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| ApiQuery(value))
            .map_err(|rejection: QueryRejection| {
                ApiError::new(rejection.status(), "INVALID_QUERY", rejection.body_text())
            })
    }
}

pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| ApiPath(value))
            .map_err(|rejection: PathRejection| {
                ApiError::new(rejection.status(), "INVALID_PATH", rejection.body_text())
            })
    }
}

/// Caller identity from a verified access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;
        authenticate(state, token).await
    }
}

/// Tenant the request acts on.
///
/// Resolution order: bearer token claims, then the `X-Tenant-ID` header,
/// then the `tenant_id` cookie. A header or cookie naming a different
/// tenant than the token is rejected with 403. Without a token the header
/// and cookie are only honoured when `auth.require_auth` is off.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant_id: Uuid,
    pub user: Option<AuthUser>,
}

impl FromRequestParts<AppState> for TenantContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let hinted = tenant_hint(&parts.headers)?;

        if let Some(token) = token {
            let user = authenticate(state, token).await?;
            if let Some(hinted) = hinted {
                if hinted != user.tenant_id {
                    warn!(
                        user_id = %user.user_id,
                        token_tenant = %user.tenant_id,
                        requested_tenant = %hinted,
                        "Tenant mismatch between token and request"
                    );
                    return Err(ApiError::forbidden("Tenant does not match the authenticated user"));
                }
            }
            return Ok(TenantContext {
                tenant_id: user.tenant_id,
                user: Some(user),
            });
        }

        if state.config.auth.require_auth {
            return Err(ApiError::unauthorized("Authentication required"));
        }

        let tenant_id = hinted.ok_or_else(|| {
            ApiError::bad_request(format!(
                "Tenant id required ({} header or {} cookie)",
                TENANT_HEADER, TENANT_COOKIE
            ))
        })?;

        let tenant = state.repos.tenants.find_by_id(&tenant_id).await?;
        match tenant {
            Some(tenant) if tenant.is_active => {
                debug!(tenant_id = %tenant_id, "Tenant resolved from request without token");
                Ok(TenantContext { tenant_id, user: None })
            }
            Some(_) => Err(ApiError::forbidden("Tenant is not active")),
            None => Err(ApiError::forbidden("Unknown tenant")),
        }
    }
}

/// Verifies the token, then that its user and tenant are still active.
async fn authenticate(state: &AppState, token: &str) -> Result<AuthUser, ApiError> {
    let claims = state
        .auth
        .verify_access_token(token)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    let user_id = claims.user_id().map_err(|e| ApiError::unauthorized(e.to_string()))?;
    let tenant_id = claims.tenant_id().map_err(|e| ApiError::unauthorized(e.to_string()))?;
    state.auth.check_access(&user_id, &tenant_id).await?;

    Ok(AuthUser {
        user_id,
        tenant_id,
        role: claims.role,
    })
}

/// `Ok(None)` without an Authorization header; a header with another
/// scheme is rejected.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| ApiError::unauthorized("Malformed Authorization header"))?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(Some(token.trim()))
        }
        _ => Err(ApiError::unauthorized("Authorization header must use the Bearer scheme")),
    }
}

/// Tenant named by the `X-Tenant-ID` header or, failing that, the cookie.
fn tenant_hint(headers: &HeaderMap) -> Result<Option<Uuid>, ApiError> {
    let from_header = headers
        .get(TENANT_HEADER)
        .map(|v| v.to_str().unwrap_or_default().trim().to_string())
        .filter(|v| !v.is_empty());

    let raw = from_header.or_else(|| cookie(headers, TENANT_COOKIE));
    raw.map(|value| {
        Uuid::parse_str(&value).map_err(|_| ApiError::bad_request(format!("Malformed tenant id: {}", value)))
    })
    .transpose()
}

fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_header_wins_over_cookie() {
        let header_id = Uuid::new_v4();
        let cookie_id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_HEADER, HeaderValue::from_str(&header_id.to_string()).unwrap());
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; tenant_id={}", cookie_id)).unwrap(),
        );
        assert_eq!(tenant_hint(&headers).unwrap(), Some(header_id));

        headers.remove(TENANT_HEADER);
        assert_eq!(tenant_hint(&headers).unwrap(), Some(cookie_id));
    }

    #[test]
    fn test_malformed_tenant_is_bad_request() {
        let mut headers = HeaderMap::new();
        headers.insert(TENANT_HEADER, HeaderValue::from_static("not-a-uuid"));
        let err = tenant_hint(&headers).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_bearer_scheme() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).unwrap().is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).unwrap(), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert!(bearer_token(&headers).is_err());
    }
}
