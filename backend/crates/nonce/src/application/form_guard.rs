//! Form Guard
//!
//! Binds a form render to its submission. Each render embeds a fresh nonce
//! scoped to the form name, user and object; a submission is trusted only if
//! that nonce comes back intact and unexpired.

use std::sync::Arc;

use platform::cipher::CipherKey;

use crate::application::config::FormDefaults;
use crate::application::context::RequestContext;
use crate::application::issue_nonce::IssueNonceUseCase;
use crate::application::validate_nonce::ValidateNonceUseCase;
use crate::domain::clock::Clock;
use crate::domain::value_objects::{NoncePolicy, NonceScope};
use crate::error::NonceResult;
use crate::presentation::field::nonce_field;

/// Message shown when a submitted nonce does not validate
pub const EXPIRED_FORM_MESSAGE: &str = "This form has expired.  Please try again.";

/// Optional submission callbacks
pub trait FormHooks {
    /// A submission is present (called before validation)
    fn on_submit(&mut self, _ctx: &RequestContext) {}

    /// The submitted nonce is valid
    fn on_valid(&mut self, _ctx: &RequestContext) {}

    /// The submitted nonce is not valid
    fn on_invalid(&mut self, _ctx: &RequestContext, _message: &str) {}
}

/// No callbacks
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl FormHooks for NoHooks {}

/// Result of inspecting a request for a form submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// The request carries no nonce field for this form
    NotSubmitted,
    Valid,
    Invalid { message: String },
}

impl FormOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, FormOutcome::Valid)
    }
}

/// Form Guard
pub struct FormGuard<C: Clock> {
    pub name: String,
    pub user_id: i64,
    pub object_id: i64,
    pub policy: NoncePolicy,
    /// Name of the hidden nonce field
    pub nonce_key: String,
    issuer: IssueNonceUseCase<C>,
    validator: ValidateNonceUseCase<C>,
}

impl<C: Clock> FormGuard<C> {
    /// Guard for an anonymous form with the default policy
    pub fn new(clock: Arc<C>, name: impl Into<String>) -> Self {
        Self::with_defaults(clock, name, &FormDefaults::default())
    }

    pub fn with_defaults(clock: Arc<C>, name: impl Into<String>, defaults: &FormDefaults) -> Self {
        Self {
            name: name.into(),
            user_id: 0,
            object_id: 0,
            policy: defaults.policy(),
            nonce_key: defaults.nonce_key.clone(),
            issuer: IssueNonceUseCase::new(Arc::clone(&clock)),
            validator: ValidateNonceUseCase::new(clock),
        }
    }

    pub fn for_user(mut self, user_id: i64) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn for_object(mut self, object_id: i64) -> Self {
        self.object_id = object_id;
        self
    }

    pub fn with_policy(mut self, policy: NoncePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_nonce_key(mut self, nonce_key: impl Into<String>) -> Self {
        self.nonce_key = nonce_key.into();
        self
    }

    fn scope(&self) -> NonceScope {
        NonceScope::new(self.name.clone(), self.user_id, self.object_id)
    }

    /// Issue a fresh nonce and return its hidden field markup
    pub fn render_nonce_field(&self, key: &CipherKey) -> NonceResult<String> {
        let nonce = self.issuer.execute(&self.scope(), &self.policy, key)?;
        Ok(nonce_field(&self.nonce_key, nonce.as_str()))
    }

    /// True iff the request payload carries this form's nonce field
    pub fn is_submitted(&self, ctx: &RequestContext) -> bool {
        ctx.field(&self.nonce_key).is_some()
    }

    /// True iff the request is a submission with a valid nonce
    pub fn is_valid(&self, ctx: &RequestContext, key: &CipherKey) -> bool {
        ctx.field(&self.nonce_key)
            .is_some_and(|nonce| self.validator.execute(nonce, &self.scope(), &self.policy, key))
    }

    /// Inspect the request, running `hooks` for each stage reached
    pub fn check_submission<H: FormHooks>(
        &self,
        ctx: &RequestContext,
        key: &CipherKey,
        hooks: &mut H,
    ) -> FormOutcome {
        let Some(nonce) = ctx.field(&self.nonce_key) else {
            return FormOutcome::NotSubmitted;
        };

        hooks.on_submit(ctx);

        if self.validator.execute(nonce, &self.scope(), &self.policy, key) {
            hooks.on_valid(ctx);
            FormOutcome::Valid
        } else {
            tracing::debug!(form = %self.name, "Rejected form submission");
            hooks.on_invalid(ctx, EXPIRED_FORM_MESSAGE);
            FormOutcome::Invalid {
                message: EXPIRED_FORM_MESSAGE.to_string(),
            }
        }
    }
}
