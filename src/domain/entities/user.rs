//! User entity representing a cookie-backed pseudonymous identity.

use chrono::{DateTime, Utc};

/// A pseudonymous identity minted for a browser.
///
/// One person can hold many identities over time; none of them is an
/// authenticated account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at,
            expires_at,
        }
    }

    /// Returns true once the identity's expiry has passed.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_user_expiry() {
        let now = Utc::now();
        let user = User::new("ABCDEFGHIJ", now, now + Duration::days(30));

        assert!(!user.is_expired_at(now));
        assert!(user.is_expired_at(now + Duration::days(30)));
        assert!(user.is_expired_at(now + Duration::days(31)));
    }
}
