//! Issue Nonce Use Case
//!
//! payload → spice (seeded by user id) → AES-256-GCM → base64

use std::sync::Arc;

use platform::cipher::{self, CipherKey};
use platform::crypto::to_base64;
use platform::spice::{self, PepperKey};

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::codec;
use crate::domain::payload::NoncePayload;
use crate::domain::value_objects::{Nonce, NoncePolicy, NonceScope};
use crate::error::NonceResult;

/// Issue Nonce Use Case
pub struct IssueNonceUseCase<C: Clock> {
    clock: Arc<C>,
}

impl<C: Clock> Clone for IssueNonceUseCase<C> {
    fn clone(&self) -> Self {
        Self {
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C: Clock> IssueNonceUseCase<C> {
    pub fn new(clock: Arc<C>) -> Self {
        Self { clock }
    }

    /// Build a fresh nonce for `scope`, expiring `policy.ttl_seconds` from now
    ///
    /// # Errors
    ///
    /// Fails if the subject contains the payload delimiter, if the pepper
    /// length is above [`platform::spice::MAX_PEPPER_LENGTH`], or if
    /// encryption itself fails.
    pub fn execute(
        &self,
        scope: &NonceScope,
        policy: &NoncePolicy,
        key: &CipherKey,
    ) -> NonceResult<Nonce> {
        policy.check().inspect_err(|e| e.log())?;

        let expires_at = self.clock.now().saturating_add(policy.ttl_seconds);
        let payload = codec::encode_payload(&NoncePayload::new(scope, expires_at))
            .inspect_err(|e| e.log())?;

        let spiced = spice::spice(
            &payload,
            &PepperKey::derive(key),
            scope.user_id,
            &policy.salt,
            policy.pepper_length,
        );

        let sealed = cipher::encrypt(spiced.as_bytes(), key.expose_secret())?;

        tracing::debug!(
            subject = %scope.subject,
            user_id = scope.user_id,
            expires_at,
            "Issued nonce"
        );

        Ok(Nonce::new(to_base64(&sealed.to_bytes())))
    }
}

/// Issue a nonce against the wall clock
pub fn issue(scope: &NonceScope, policy: &NoncePolicy, key: &CipherKey) -> NonceResult<Nonce> {
    IssueNonceUseCase::new(Arc::new(SystemClock)).execute(scope, policy, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;
    use crate::error::NonceError;
    use platform::cipher::{IV_LEN, TAG_LEN};
    use platform::crypto::from_base64;
    use platform::spice::MAX_PEPPER_LENGTH;

    #[test]
    fn test_nonce_layout() {
        let key = CipherKey::generate();
        let issuer = IssueNonceUseCase::new(Arc::new(ManualClock::new(1_000)));
        let scope = NonceScope::new("login-form", 7, 0);
        let policy = NoncePolicy::new(3600, "_s", 3);

        let nonce = issuer.execute(&scope, &policy, &key).unwrap();
        let bytes = from_base64(nonce.as_str()).unwrap();

        // "login-form|7|0|4600" + "_s" + 3 pepper chars
        let spiced_len = "login-form|7|0|4600".len() + 2 + 3;
        assert_eq!(bytes.len(), IV_LEN + TAG_LEN + spiced_len);
    }

    #[test]
    fn test_fresh_nonce_every_call() {
        let key = CipherKey::generate();
        let issuer = IssueNonceUseCase::new(Arc::new(ManualClock::new(1_000)));
        let scope = NonceScope::new("f", 1, 0);
        let policy = NoncePolicy::new(60, "_", 2);

        let a = issuer.execute(&scope, &policy, &key).unwrap();
        let b = issuer.execute(&scope, &policy, &key).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_rejects_subject_with_delimiter() {
        let key = CipherKey::generate();
        let result = issue(
            &NonceScope::new("a|b", 1, 0),
            &NoncePolicy::new(60, "_", 2),
            &key,
        );
        assert!(matches!(result, Err(NonceError::InvalidSubject('|'))));
    }

    #[test]
    fn test_rejects_oversized_pepper_length() {
        let key = CipherKey::generate();
        let issuer = IssueNonceUseCase::new(Arc::new(ManualClock::new(0)));
        let scope = NonceScope::new("f", 1, 0);

        for pepper_length in [MAX_PEPPER_LENGTH + 1, 1 << 33, usize::MAX] {
            let result = issuer.execute(&scope, &NoncePolicy::new(60, "_", pepper_length), &key);
            let Err(NonceError::PepperTooLong { got, .. }) = result else {
                panic!("expected PepperTooLong for {pepper_length}");
            };
            assert_eq!(got, pepper_length);
        }

        let longest = NoncePolicy::new(60, "_", MAX_PEPPER_LENGTH);
        assert!(issuer.execute(&scope, &longest, &key).is_ok());
    }
}
