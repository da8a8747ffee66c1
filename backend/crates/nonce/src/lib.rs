//! Nonce Module
//!
//! Clean Architecture structure:
//! - `domain/` - Payload, codec, clock, session store trait
//! - `application/` - Issue/validate use cases, form and session guards
//! - `infra/` - Session store implementations
//! - `presentation/` - Hidden field markup
//!
//! ## Token format
//! `base64(iv || tag || AES-256-GCM(spice(subject|user_id|object_id|expires_at)))`
//!
//! ## Security Model
//! - Nonces are stateless: validity is recomputed from the token, the
//!   expected identity and the current time
//! - The cipher key never appears in logs or error messages
//! - Every validation failure looks the same to the caller (`false`)
//! - Pepper characters are keyed, so the spice layer cannot be reproduced
//!   without the cipher key

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::NonceConfig;
pub use application::{
    FormGuard, FormHooks, FormOutcome, IssueNonceUseCase, NoHooks, RequestContext, SessionGuard,
    ValidateNonceUseCase, issue, validate,
};
pub use domain::{
    Clock, ManualClock, Nonce, NoncePayload, NoncePolicy, NonceScope, SessionStore, SystemClock,
};
pub use error::{ConfigError, DecodeError, NonceError, NonceResult};
pub use infra::MemorySessionStore;
pub use platform::cipher::CipherKey;
pub use presentation::nonce_field;

#[cfg(test)]
mod tests;
