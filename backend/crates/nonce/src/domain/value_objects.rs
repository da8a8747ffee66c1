//! Domain Value Objects

use std::fmt;

use platform::spice::MAX_PEPPER_LENGTH;

use crate::error::{NonceError, NonceResult};

/// An issued token: base64 of `IV || tag || ciphertext`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nonce(String);

impl Nonce {
    pub(crate) fn new(encoded: String) -> Self {
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Nonce {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identity a nonce is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonceScope {
    /// Form name, or "session"
    pub subject: String,
    pub user_id: i64,
    pub object_id: i64,
}

impl NonceScope {
    pub fn new(subject: impl Into<String>, user_id: i64, object_id: i64) -> Self {
        Self {
            subject: subject.into(),
            user_id,
            object_id,
        }
    }
}

/// Per-call encoding parameters
///
/// Issue and validate must be given the same salt and pepper length.
/// `ttl_seconds` only matters when issuing; a negative ttl issues an
/// already-expired nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoncePolicy {
    pub ttl_seconds: i64,
    pub salt: String,
    pub pepper_length: usize,
}

impl NoncePolicy {
    pub fn new(ttl_seconds: i64, salt: impl Into<String>, pepper_length: usize) -> Self {
        Self {
            ttl_seconds,
            salt: salt.into(),
            pepper_length,
        }
    }

    /// Reject pepper lengths the spice layer should not be asked for
    pub fn check(&self) -> NonceResult<()> {
        if self.pepper_length > MAX_PEPPER_LENGTH {
            return Err(NonceError::PepperTooLong {
                max: MAX_PEPPER_LENGTH,
                got: self.pepper_length,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_pepper_length_bound() {
        assert!(NoncePolicy::new(60, "_", 0).check().is_ok());
        assert!(NoncePolicy::new(60, "_", MAX_PEPPER_LENGTH).check().is_ok());
        assert!(matches!(
            NoncePolicy::new(60, "_", MAX_PEPPER_LENGTH + 1).check(),
            Err(NonceError::PepperTooLong { max: MAX_PEPPER_LENGTH, got: 65 })
        ));
    }
}
