//! Application Layer
//!
//! Use cases and the form/session guards built on them.

pub mod config;
pub mod context;
pub mod form_guard;
pub mod issue_nonce;
pub mod session_guard;
pub mod validate_nonce;

// Re-exports
pub use config::{FormDefaults, NonceConfig, SessionDefaults};
pub use context::RequestContext;
pub use form_guard::{FormGuard, FormHooks, FormOutcome, NoHooks};
pub use issue_nonce::{IssueNonceUseCase, issue};
pub use session_guard::SessionGuard;
pub use validate_nonce::{ValidateNonceUseCase, validate};
