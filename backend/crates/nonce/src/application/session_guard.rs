//! Session Guard
//!
//! A session is a nonce for subject "session", bound to the user id and to a
//! hash of the client address, stored next to the raw user agent and address.
//! It stays valid while the nonce does and the client looks the same.

use std::sync::Arc;

use platform::cipher::CipherKey;

use crate::application::config::SessionDefaults;
use crate::application::context::RequestContext;
use crate::application::issue_nonce::IssueNonceUseCase;
use crate::application::validate_nonce::ValidateNonceUseCase;
use crate::domain::clock::Clock;
use crate::domain::repository::SessionStore;
use crate::domain::value_objects::{NoncePolicy, NonceScope};
use crate::error::NonceResult;

/// Subject of every session nonce
pub const SESSION_SUBJECT: &str = "session";

/// Session Guard
pub struct SessionGuard<C: Clock> {
    /// Prefix of the store keys
    pub prefix: String,
    pub policy: NoncePolicy,
    issuer: IssueNonceUseCase<C>,
    validator: ValidateNonceUseCase<C>,
}

impl<C: Clock> SessionGuard<C> {
    pub fn new(clock: Arc<C>) -> Self {
        Self::with_defaults(clock, &SessionDefaults::default())
    }

    pub fn with_defaults(clock: Arc<C>, defaults: &SessionDefaults) -> Self {
        Self {
            prefix: defaults.prefix.clone(),
            policy: defaults.policy(),
            issuer: IssueNonceUseCase::new(Arc::clone(&clock)),
            validator: ValidateNonceUseCase::new(clock),
        }
    }

    fn key(&self, suffix: char) -> String {
        format!("{}{suffix}", self.prefix)
    }

    /// Start a session for `user_id`, replacing any existing one
    pub fn create<S: SessionStore + ?Sized>(
        &self,
        store: &S,
        ctx: &RequestContext,
        user_id: i64,
        key: &CipherKey,
    ) -> NonceResult<()> {
        self.destroy(store);

        let scope = NonceScope::new(SESSION_SUBJECT, user_id, ctx.client.object_id());
        let nonce = self.issuer.execute(&scope, &self.policy, key)?;

        store.set(&self.key('n'), nonce.into_string());
        store.set(&self.key('u'), user_id.to_string());
        store.set(&self.key('a'), ctx.client.user_agent.clone().unwrap_or_default());
        store.set(&self.key('i'), ctx.client.address.clone().unwrap_or_default());

        tracing::debug!(user_id, "Created session");
        Ok(())
    }

    /// Drop every session value
    pub fn destroy<S: SessionStore + ?Sized>(&self, store: &S) {
        store.clear();
    }

    /// True iff a session nonce is stored (it may still be invalid)
    pub fn is_active<S: SessionStore + ?Sized>(&self, store: &S) -> bool {
        store.get(&self.key('n')).is_some_and(|n| !n.is_empty())
    }

    /// True iff the stored nonce is valid for `user_id` and the current
    /// client, and the stored user agent and address match the request
    pub fn is_valid<S: SessionStore + ?Sized>(
        &self,
        store: &S,
        ctx: &RequestContext,
        user_id: i64,
        key: &CipherKey,
    ) -> bool {
        let Some(nonce) = store.get(&self.key('n')).filter(|n| !n.is_empty()) else {
            return false;
        };

        let scope = NonceScope::new(SESSION_SUBJECT, user_id, ctx.client.object_id());
        let nonce_valid = self.validator.execute(&nonce, &scope, &self.policy, key);

        let stored_agent = store.get(&self.key('a')).unwrap_or_default();
        let stored_address = store.get(&self.key('i')).unwrap_or_default();
        let agent = ctx.client.user_agent.as_deref().unwrap_or_default();
        let address = ctx.client.address.as_deref().unwrap_or_default();

        let client_matches = stored_agent == agent && stored_address == address;
        if !client_matches {
            tracing::warn!(user_id, "Session client binding mismatch");
        }

        nonce_valid && client_matches
    }

    /// Stored user id of an active session
    pub fn user_id<S: SessionStore + ?Sized>(&self, store: &S) -> Option<i64> {
        if !self.is_active(store) {
            return None;
        }
        store.get(&self.key('u'))?.parse().ok()
    }
}
