//! Password reset request

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PasswordReset {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PasswordReset {
    pub fn new(user_id: Uuid, token_hash: String, ttl_seconds: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            expires_at: now + Duration::seconds(ttl_seconds),
            used_at: None,
            created_at: now,
        }
    }

    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_until_expiry_or_use() {
        let mut reset = PasswordReset::new(Uuid::new_v4(), "hash".to_string(), 60);
        assert!(reset.is_usable(Utc::now()));
        assert!(!reset.is_usable(Utc::now() + Duration::seconds(120)));

        reset.used_at = Some(Utc::now());
        assert!(!reset.is_usable(Utc::now()));
    }
}
