//! Domain Layer - Nonce vocabulary and pure logic
//!
//! This layer contains:
//! - The decoded payload entity (NoncePayload)
//! - Value objects (Nonce, NonceScope, NoncePolicy)
//! - The payload codec
//! - The clock abstraction
//! - The session store trait

pub mod clock;
pub mod codec;
pub mod payload;
pub mod repository;
pub mod value_objects;

// Re-exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use payload::NoncePayload;
pub use repository::SessionStore;
pub use value_objects::{Nonce, NoncePolicy, NonceScope};
