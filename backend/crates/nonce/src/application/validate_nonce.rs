//! Validate Nonce Use Case
//!
//! Inverse of issuing, followed by the identity and expiry checks. Every
//! failure collapses to `false` in [`ValidateNonceUseCase::execute`]; the
//! reason is only visible in debug logs and through [`ValidateNonceUseCase::open`].

use std::sync::Arc;

use platform::cipher::{self, CipherKey, Sealed};
use platform::crypto::from_base64;
use platform::spice::{self, PepperKey};

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::codec;
use crate::domain::payload::NoncePayload;
use crate::domain::value_objects::{NoncePolicy, NonceScope};
use crate::error::{DecodeError, NonceError, NonceResult};

/// Validate Nonce Use Case
pub struct ValidateNonceUseCase<C: Clock> {
    clock: Arc<C>,
}

impl<C: Clock> Clone for ValidateNonceUseCase<C> {
    fn clone(&self) -> Self {
        Self {
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C: Clock> ValidateNonceUseCase<C> {
    pub fn new(clock: Arc<C>) -> Self {
        Self { clock }
    }

    /// True iff `nonce` was issued for `expected` with the same salt, pepper
    /// length and key, and has not expired
    ///
    /// `policy.ttl_seconds` is not consulted: the expiry is sealed inside the
    /// token.
    pub fn execute(
        &self,
        nonce: &str,
        expected: &NonceScope,
        policy: &NoncePolicy,
        key: &CipherKey,
    ) -> bool {
        match self.open(nonce, expected, policy, key) {
            Ok(_) => true,
            Err(e) => {
                e.log();
                false
            }
        }
    }

    /// Run every check, returning the payload or the first failure
    pub fn open(
        &self,
        nonce: &str,
        expected: &NonceScope,
        policy: &NoncePolicy,
        key: &CipherKey,
    ) -> NonceResult<NoncePayload> {
        policy.check()?;

        let bytes = from_base64(nonce.trim()).map_err(|_| NonceError::Encoding)?;
        let sealed = Sealed::from_bytes(&bytes)?;
        let plaintext = cipher::open(&sealed, key.expose_secret())?;
        let spiced = String::from_utf8(plaintext).map_err(|_| DecodeError::NotUtf8)?;

        let pepper_key = PepperKey::derive(key);
        if !spice::check_spice(
            &spiced,
            &pepper_key,
            expected.user_id,
            &policy.salt,
            policy.pepper_length,
        ) {
            return Err(NonceError::SpiceMismatch);
        }

        let serialized = spice::unspice(
            &spiced,
            &pepper_key,
            expected.user_id,
            &policy.salt,
            policy.pepper_length,
        );
        let payload = codec::decode(&serialized)?;

        if !payload.matches(expected) {
            return Err(NonceError::IdentityMismatch);
        }
        if !payload.is_live_at(self.clock.now()) {
            return Err(NonceError::Expired);
        }
        Ok(payload)
    }
}

/// Validate a nonce against the wall clock
pub fn validate(nonce: &str, expected: &NonceScope, policy: &NoncePolicy, key: &CipherKey) -> bool {
    ValidateNonceUseCase::new(Arc::new(SystemClock)).execute(nonce, expected, policy, key)
}
