//! Decoded nonce payload

use crate::domain::value_objects::NonceScope;

/// The four fields sealed inside a nonce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoncePayload {
    pub subject: String,
    pub user_id: i64,
    pub object_id: i64,
    /// Epoch seconds
    pub expires_at: i64,
}

impl NoncePayload {
    pub fn new(scope: &NonceScope, expires_at: i64) -> Self {
        Self {
            subject: scope.subject.clone(),
            user_id: scope.user_id,
            object_id: scope.object_id,
            expires_at,
        }
    }

    /// Exact match on subject, user id and object id
    pub fn matches(&self, expected: &NonceScope) -> bool {
        self.subject == expected.subject
            && self.user_id == expected.user_id
            && self.object_id == expected.object_id
    }

    /// Still valid at `now`; the expiry second itself is included
    pub fn is_live_at(&self, now: i64) -> bool {
        now <= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_requires_all_fields() {
        let payload = NoncePayload::new(&NonceScope::new("login-form", 7, 0), 100);
        assert!(payload.matches(&NonceScope::new("login-form", 7, 0)));
        assert!(!payload.matches(&NonceScope::new("login-form", 7, 1)));
        assert!(!payload.matches(&NonceScope::new("login-form", 2, 0)));
        assert!(!payload.matches(&NonceScope::new("Login-form", 7, 0)));
    }

    #[test]
    fn test_expiry_boundary() {
        let payload = NoncePayload::new(&NonceScope::new("f", 1, 0), 100);
        assert!(payload.is_live_at(99));
        assert!(payload.is_live_at(100));
        assert!(!payload.is_live_at(101));
    }
}
