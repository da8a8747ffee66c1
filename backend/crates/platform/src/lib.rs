//! Platform Crate - Technical Infrastructure
//!
//! This crate provides the primitives the nonce protocol is built from:
//! - Cryptographic utilities (SHA-256, HMAC, Base64, CSPRNG)
//! - Authenticated encryption (AES-256-GCM)
//! - Salt / pepper / spice string layers
//! - Password hashing (Argon2id)
//! - Client identification

pub mod cipher;
pub mod client;
pub mod crypto;
pub mod password;
pub mod spice;
