//! HTTP error type and its JSON rendering

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use echo_core::error::DomainError;
use thiserror::Error;

use crate::response::ApiResponse;

const GENERIC_SERVER_ERROR: &str = "An internal error occurred";

/// Error returned by every handler and extractor.
///
/// `details` carries the internal error chain; it only reaches the client
/// when the server runs in development (see [`expose_error_details`]).
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", message)
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, "TOO_MANY_REQUESTS", message)
    }

    pub fn server_error(details: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", GENERIC_SERVER_ERROR)
            .with_details(details)
    }

    fn render(&self, expose: bool) -> Response {
        let message = if expose || !self.status.is_server_error() {
            self.message.clone()
        } else {
            GENERIC_SERVER_ERROR.to_string()
        };
        let details = if expose { self.details.clone() } else { None };

        (
            self.status,
            Json(ApiResponse::<()>::error(self.code, message, details)),
        )
            .into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();
        match err {
            DomainError::NotFound { .. } | DomainError::TenantNotFound => {
                ApiError::not_found(message)
            }
            DomainError::InvalidReference { .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, "INVALID_REFERENCE", message)
            }
            DomainError::ValidationError(_) => {
                ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
            }
            DomainError::PasswordTooShort | DomainError::PasswordTooLong | DomainError::PasswordTooWeak => {
                ApiError::new(StatusCode::BAD_REQUEST, "WEAK_PASSWORD", message)
            }
            DomainError::InvalidResetToken => {
                ApiError::new(StatusCode::BAD_REQUEST, "INVALID_RESET_TOKEN", message)
            }
            DomainError::InvalidCredentials => {
                ApiError::new(StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS", message)
            }
            DomainError::InvalidToken(_) | DomainError::UserNotFound => {
                ApiError::new(StatusCode::UNAUTHORIZED, "INVALID_TOKEN", message)
            }
            DomainError::UserNotActive | DomainError::TenantNotActive => {
                ApiError::new(StatusCode::FORBIDDEN, "ACCOUNT_INACTIVE", message)
            }
            DomainError::EmailAlreadyExists(_)
            | DomainError::TenantSlugAlreadyExists(_)
            | DomainError::UnableToGenerateUniqueName => ApiError::conflict(message),
            DomainError::PasswordHashError(_)
            | DomainError::TokenGenerationError(_)
            | DomainError::DatabaseError(_)
            | DomainError::InternalError(_) => ApiError::server_error(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = self.status.as_u16(),
                code = self.code,
                details = self.details.as_deref().unwrap_or_default(),
                "{}",
                self.message
            );
        } else {
            tracing::warn!(status = self.status.as_u16(), code = self.code, "{}", self.message);
        }

        let mut response = self.render(false);
        response.extensions_mut().insert(self);
        response
    }
}

/// Response mapper installed in development: re-renders error bodies with
/// the full message and `details`.
pub async fn expose_error_details(response: Response) -> Response {
    match response.extensions().get::<ApiError>() {
        Some(err) => err.render(true),
        None => response,
    }
}
