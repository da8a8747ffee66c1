//! Authenticated Symmetric Encryption
//!
//! AES-256-GCM over opaque byte payloads. Every call to [`encrypt`] draws a
//! fresh 96-bit IV from the CSPRNG, so a key may seal many plaintexts as long
//! as the IV space is not exhausted.
//!
//! ## Wire format
//! ```text
//! IV (12 bytes) || tag (16 bytes) || ciphertext
//! ```
//! The tag is kept detached from the ciphertext so the layout matches the
//! nonce tokens built on top of this module.

use std::fmt;

use aes_gcm::{
    Aes256Gcm, Nonce, Tag,
    aead::{AeadInPlace, KeyInit},
};
use rand::{CryptoRng, RngCore, rngs::OsRng};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{random_bytes, to_base64};

/// Byte length of an AES-256 key (32 bytes = 256 bits)
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM IV (12 bytes = 96 bits)
pub const IV_LEN: usize = 12;

/// Byte length of an AES-GCM authentication tag
pub const TAG_LEN: usize = 16;

/// Errors produced by the cipher layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    /// The key is the wrong length
    #[error("invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    /// Encryption failed, or decryption failed authentication
    #[error("aead operation failed")]
    AeadFailure,

    /// Sealed bytes are too short or the IV/tag have the wrong size
    #[error("malformed sealed payload")]
    Malformed,
}

// ============================================================================
// Cipher Key (Zeroized on drop)
// ============================================================================

/// Process-wide symmetric key
///
/// Immutable once loaded. Debug output is redacted and the bytes are wiped
/// when the key is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CipherKey([u8; KEY_LEN]);

impl CipherKey {
    /// Build a key from raw bytes, rejecting anything but [`KEY_LEN`] bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CipherError> {
        if bytes.len() != KEY_LEN {
            return Err(CipherError::InvalidKeyLength {
                expected: KEY_LEN,
                got: bytes.len(),
            });
        }
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Generate a fresh random key
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        Self(key)
    }

    /// Raw key material
    pub fn expose_secret(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CipherKey").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// Sealed payload
// ============================================================================

/// Output of [`encrypt`]: ciphertext with its IV and detached tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub iv: [u8; IV_LEN],
    pub tag: [u8; TAG_LEN],
}

impl Sealed {
    /// Concatenate as `IV || tag || ciphertext`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(IV_LEN + TAG_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Split `IV || tag || ciphertext` back into its parts
    ///
    /// An empty ciphertext is structurally valid; only inputs shorter than
    /// the IV and tag together are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CipherError> {
        if bytes.len() < IV_LEN + TAG_LEN {
            return Err(CipherError::Malformed);
        }
        let (iv_bytes, rest) = bytes.split_at(IV_LEN);
        let (tag_bytes, ciphertext) = rest.split_at(TAG_LEN);

        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(iv_bytes);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(tag_bytes);

        Ok(Self {
            ciphertext: ciphertext.to_vec(),
            iv,
            tag,
        })
    }
}

// ============================================================================
// Operations
// ============================================================================

/// Generate a base64-encoded random key of exactly `byte_len` bytes
///
/// Meant for one-off configuration, not per-request use. Only a 32-byte key
/// is accepted by [`encrypt`]; other lengths are allowed here so operators
/// can mint secrets for other purposes.
pub fn get_key(byte_len: usize) -> String {
    to_base64(&random_bytes(byte_len))
}

/// Generate a random IV from the OS CSPRNG
pub fn get_iv() -> [u8; IV_LEN] {
    generate_iv_with(&mut OsRng)
}

/// Generate a random IV from a caller-supplied CSPRNG
pub fn generate_iv_with<R: RngCore + CryptoRng>(rng: &mut R) -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    rng.fill_bytes(&mut iv);
    iv
}

/// Encrypt `plaintext` under `key` with a fresh random IV
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<Sealed, CipherError> {
    encrypt_with_rng(plaintext, key, &mut OsRng)
}

/// Encrypt with the IV drawn from `rng`
pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
    plaintext: &[u8],
    key: &[u8],
    rng: &mut R,
) -> Result<Sealed, CipherError> {
    let cipher = build_cipher(key)?;
    let iv = generate_iv_with(rng);

    let mut buffer = plaintext.to_vec();
    let tag_bytes = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&iv), b"", &mut buffer)
        .map_err(|_| CipherError::AeadFailure)?;

    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&tag_bytes);

    Ok(Sealed {
        ciphertext: buffer,
        iv,
        tag,
    })
}

/// Decrypt and authenticate `ciphertext`
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] for a wrong-sized key,
/// [`CipherError::Malformed`] when the IV or tag have the wrong size, and
/// [`CipherError::AeadFailure`] when the tag does not verify. A modified
/// ciphertext, IV or tag never yields plaintext.
pub fn decrypt(
    ciphertext: &[u8],
    key: &[u8],
    iv: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, CipherError> {
    let cipher = build_cipher(key)?;
    if iv.len() != IV_LEN || tag.len() != TAG_LEN {
        return Err(CipherError::Malformed);
    }

    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(iv),
            b"",
            &mut buffer,
            Tag::from_slice(tag),
        )
        .map_err(|_| CipherError::AeadFailure)?;
    Ok(buffer)
}

/// Decrypt a [`Sealed`] value
pub fn open(sealed: &Sealed, key: &[u8]) -> Result<Vec<u8>, CipherError> {
    decrypt(&sealed.ciphertext, key, &sealed.iv, &sealed.tag)
}

fn build_cipher(key: &[u8]) -> Result<Aes256Gcm, CipherError> {
    if key.len() != KEY_LEN {
        return Err(CipherError::InvalidKeyLength {
            expected: KEY_LEN,
            got: key.len(),
        });
    }
    Aes256Gcm::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength {
        expected: KEY_LEN,
        got: key.len(),
    })
}
