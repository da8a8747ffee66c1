//! Presentation Layer
//!
//! Markup handed to the HTML layer.

pub mod field;

pub use field::nonce_field;
