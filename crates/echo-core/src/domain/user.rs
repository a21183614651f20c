// ============================================================================
// Echo Core - User Entity
// File: crates/echo-core/src/domain/user.rs
// Description: Login account belonging to a single tenant
// ============================================================================

use chrono::{DateTime, Utc};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::DomainError;

labeled_enum! {
    pub enum UserRole("user role") {
        Admin => "admin",
        Member => "member",
    }
    default = Member;
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,

    #[validate(length(min = 3, max = 254, message = "Email must be between 3 and 254 characters"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: UserRole,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(
        tenant_id: Uuid,
        name: String,
        email: String,
        password_hash: String,
        role: UserRole,
    ) -> Result<Self, DomainError> {
        let email = Self::normalize_email(&email);
        if !EmailAddress::is_valid(&email) {
            return Err(DomainError::ValidationError(format!("Invalid email address: {}", email)));
        }

        let user = Self {
            id: Uuid::new_v4(),
            tenant_id,
            email,
            name: name.trim().to_string(),
            password_hash,
            role,
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
            modified_at: None,
        };

        user.validate()?;
        Ok(user)
    }

    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    pub fn can_login(&self) -> bool {
        self.is_active
    }

    pub fn record_login(&mut self) {
        self.last_login = Some(Utc::now());
    }

    pub fn set_password_hash(&mut self, hash: String) {
        self.password_hash = hash;
        self.modified_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_normalized() {
        let user = User::new(
            Uuid::new_v4(),
            "Ada".to_string(),
            "  Ada@Example.COM ".to_string(),
            "hash".to_string(),
            UserRole::Admin,
        )
        .unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert!(user.can_login());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let result = User::new(
            Uuid::new_v4(),
            "Ada".to_string(),
            "not-an-email".to_string(),
            "hash".to_string(),
            UserRole::Member,
        );
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new(
            Uuid::new_v4(),
            "Ada".to_string(),
            "ada@example.com".to_string(),
            "secret-hash".to_string(),
            UserRole::Member,
        )
        .unwrap();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("password_hash"));
    }
}
