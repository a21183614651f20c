//! Domain errors

use echo_security::PasswordError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: Uuid },

    #[error("Referenced {kind} does not exist: {id}")]
    InvalidReference { kind: &'static str, id: Uuid },

    #[error("User not found")]
    UserNotFound,

    #[error("User not active")]
    UserNotActive,

    #[error("Tenant not found")]
    TenantNotFound,

    #[error("Tenant not active")]
    TenantNotActive,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Reset token is invalid or expired")]
    InvalidResetToken,

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Tenant slug already exists: {0}")]
    TenantSlugAlreadyExists(String),

    #[error("Unable to generate unique name")]
    UnableToGenerateUniqueName,

    #[error("Password too short")]
    PasswordTooShort,

    #[error("Password too long")]
    PasswordTooLong,

    #[error("Password too weak")]
    PasswordTooWeak,

    #[error("Password hash error: {0}")]
    PasswordHashError(String),

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}

impl From<PasswordError> for DomainError {
    fn from(error: PasswordError) -> Self {
        match error {
            PasswordError::TooShort => DomainError::PasswordTooShort,
            PasswordError::TooLong => DomainError::PasswordTooLong,
            PasswordError::TooWeak => DomainError::PasswordTooWeak,
            PasswordError::HashError(msg) => DomainError::PasswordHashError(msg),
        }
    }
}
