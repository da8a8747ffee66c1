//! Salt, Pepper and Spice
//!
//! Reversible string layers applied to a payload before it is encrypted.
//!
//! - **Salt**: a caller-chosen suffix, not secret
//! - **Pepper**: a keyed, seed-derived marker of fixed length, inserted at a
//!   seed-dependent offset
//! - **Spice**: salt first, then pepper; removal runs in the inverse order
//!
//! All positions and lengths are counted in `char`s so multi-byte input is
//! never split inside a code point.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::cipher::CipherKey;
use crate::crypto::{constant_time_eq, hmac_sha256};

/// Pepper characters are drawn from the URL-safe base64 alphabet.
/// 64 symbols divide 256 evenly, so `byte & 63` is unbiased.
const PEPPER_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Longest pepper callers should request. The layers themselves do not
/// enforce it; the nonce use cases reject longer policies up front.
pub const MAX_PEPPER_LENGTH: usize = 64;

const PEPPER_KEY_LABEL: &[u8] = b"nonce-pepper-key-v1";
const PEPPER_VALUE_LABEL: &[u8] = b"pepper";
const PEPPER_OFFSET_LABEL: &[u8] = b"offset";

// ============================================================================
// Pepper Key
// ============================================================================

/// Secret used to derive pepper strings and their insertion offsets
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PepperKey([u8; 32]);

impl PepperKey {
    /// Wrap raw key material
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive a pepper key from the process cipher key
    ///
    /// The derivation is domain-separated, so the AEAD key itself never keys
    /// the pepper HMAC.
    pub fn derive(cipher_key: &CipherKey) -> Self {
        Self(hmac_sha256(cipher_key.expose_secret(), &[PEPPER_KEY_LABEL]))
    }
}

impl fmt::Debug for PepperKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PepperKey").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// Salt
// ============================================================================

/// Append `salt` to `input`
pub fn salt(input: &str, salt: &str) -> String {
    let mut out = String::with_capacity(input.len() + salt.len());
    out.push_str(input);
    out.push_str(salt);
    out
}

/// Strip a trailing `salt` from `input`
///
/// When `salt` is not a suffix the input comes back unchanged; the mismatch
/// is caught later by the identity checks.
pub fn unsalt(input: &str, salt: &str) -> String {
    input.strip_suffix(salt).unwrap_or(input).to_string()
}

/// True iff `input` ends with `salt`
pub fn check_salt(input: &str, salt: &str) -> bool {
    input.ends_with(salt)
}

// ============================================================================
// Pepper
// ============================================================================

/// Derive the pepper for `seed`, exactly `length` characters long
///
/// Same key, seed and length always give the same string.
pub fn get_pepper(key: &PepperKey, seed: i64, length: usize) -> String {
    let seed_bytes = seed.to_be_bytes();
    let length_bytes = (length as u64).to_be_bytes();

    let mut pepper = String::with_capacity(length);
    let mut counter: u32 = 0;
    while pepper.len() < length {
        let block = hmac_sha256(
            &key.0,
            &[
                PEPPER_VALUE_LABEL,
                &seed_bytes,
                &length_bytes,
                &counter.to_be_bytes(),
            ],
        );
        for byte in block.iter().take(length - pepper.len()) {
            pepper.push(PEPPER_ALPHABET[(byte & 63) as usize] as char);
        }
        counter = counter.wrapping_add(1);
    }
    pepper
}

/// Insert the pepper into `input`
///
/// The result is exactly `length` characters longer than `input`.
pub fn pepper(input: &str, key: &PepperKey, seed: i64, length: usize) -> String {
    let chars: Vec<char> = input.chars().collect();
    let offset = pepper_offset(key, seed, length, chars.len());

    let mut out = String::with_capacity(input.len() + length);
    out.extend(&chars[..offset]);
    out.push_str(&get_pepper(key, seed, length));
    out.extend(&chars[offset..]);
    out
}

/// Remove the pepper segment from `input`
///
/// Extraction is positional only; use [`check_pepper`] to see whether the
/// removed segment was the expected pepper. Input shorter than `length`
/// cannot contain a pepper and is returned as is.
pub fn unpepper(input: &str, key: &PepperKey, seed: i64, length: usize) -> String {
    match split_pepper(input, key, seed, length) {
        Some((before, _, after)) => {
            let mut out = String::with_capacity(input.len());
            out.extend(before);
            out.extend(after);
            out
        }
        None => input.to_string(),
    }
}

/// True iff the segment at the pepper position equals the expected pepper
pub fn check_pepper(input: &str, key: &PepperKey, seed: i64, length: usize) -> bool {
    match split_pepper(input, key, seed, length) {
        Some((_, segment, _)) => {
            let segment: String = segment.iter().collect();
            constant_time_eq(
                segment.as_bytes(),
                get_pepper(key, seed, length).as_bytes(),
            )
        }
        None => false,
    }
}

/// Split peppered input into (before, pepper segment, after)
fn split_pepper(
    input: &str,
    key: &PepperKey,
    seed: i64,
    length: usize,
) -> Option<(Vec<char>, Vec<char>, Vec<char>)> {
    let chars: Vec<char> = input.chars().collect();
    let original_len = chars.len().checked_sub(length)?;
    let offset = pepper_offset(key, seed, length, original_len);

    Some((
        chars[..offset].to_vec(),
        chars[offset..offset + length].to_vec(),
        chars[offset + length..].to_vec(),
    ))
}

/// Insertion offset in `[0, original_len]`, derived from the seed
fn pepper_offset(key: &PepperKey, seed: i64, length: usize, original_len: usize) -> usize {
    let digest = hmac_sha256(
        &key.0,
        &[
            PEPPER_OFFSET_LABEL,
            &seed.to_be_bytes(),
            &(length as u64).to_be_bytes(),
            &(original_len as u64).to_be_bytes(),
        ],
    );
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(head) % (original_len as u64 + 1)) as usize
}

// ============================================================================
// Spice
// ============================================================================

/// Salt, then pepper
pub fn spice(input: &str, key: &PepperKey, seed: i64, salt_value: &str, length: usize) -> String {
    pepper(&salt(input, salt_value), key, seed, length)
}

/// Inverse of [`spice`]: unpepper, then unsalt
pub fn unspice(
    input: &str,
    key: &PepperKey,
    seed: i64,
    salt_value: &str,
    length: usize,
) -> String {
    unsalt(&unpepper(input, key, seed, length), salt_value)
}

/// True iff both the pepper and the salt are where [`spice`] put them
pub fn check_spice(
    input: &str,
    key: &PepperKey,
    seed: i64,
    salt_value: &str,
    length: usize,
) -> bool {
    check_pepper(input, key, seed, length)
        && check_salt(&unpepper(input, key, seed, length), salt_value)
}
