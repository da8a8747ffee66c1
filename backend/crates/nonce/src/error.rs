//! Nonce Error Types
//!
//! Every validation failure maps to a variant here, but callers of
//! `validate` only ever see `false`: the variants exist for logging and for
//! the `open` entry points used in tests and tooling.

use platform::cipher::CipherError;
use thiserror::Error;

/// Nonce-specific result type alias
pub type NonceResult<T> = Result<T, NonceError>;

/// Startup configuration failures. Always fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Required environment variable is not set
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    /// Key is not valid base64
    #[error("Cipher key is not valid base64")]
    InvalidBase64,

    /// Key decodes to the wrong number of bytes
    #[error("Cipher key must be {expected} bytes (got {got})")]
    InvalidKeyLength { expected: usize, got: usize },
}

/// Serialized payload does not have the expected shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("expected {expected} fields, got {got}")]
    FieldCount { expected: usize, got: usize },

    #[error("field `{0}` is not an integer")]
    InvalidInteger(&'static str),

    #[error("payload is not valid UTF-8")]
    NotUtf8,
}

/// Nonce-specific error variants
#[derive(Debug, Error)]
pub enum NonceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Encryption failed, or decryption failed authentication
    #[error("Cipher error: {0}")]
    Crypto(#[from] CipherError),

    /// Token is not base64
    #[error("Nonce is not valid base64")]
    Encoding,

    #[error("Payload decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Pepper length above [`platform::spice::MAX_PEPPER_LENGTH`]
    #[error("Pepper length must be at most {max} (got {got})")]
    PepperTooLong { max: usize, got: usize },

    /// Subject name contains the payload delimiter
    #[error("Subject name must not contain '{0}'")]
    InvalidSubject(char),

    /// Salt or pepper not where they were put
    #[error("Spice check failed")]
    SpiceMismatch,

    /// Subject, user id or object id differ from the expected ones
    #[error("Nonce identity mismatch")]
    IdentityMismatch,

    #[error("Nonce expired")]
    Expired,
}

impl NonceError {
    /// True for failures that must abort initialization
    pub fn is_fatal(&self) -> bool {
        matches!(self, NonceError::Config(_))
    }

    /// Short category used in log fields
    pub fn reason(&self) -> &'static str {
        match self {
            NonceError::Config(_) => "config",
            NonceError::Crypto(_) => "crypto",
            NonceError::Encoding => "encoding",
            NonceError::Decode(_) => "decode",
            NonceError::InvalidSubject(_) => "invalid_subject",
            NonceError::PepperTooLong { .. } => "pepper_length",
            NonceError::SpiceMismatch => "spice",
            NonceError::IdentityMismatch => "identity",
            NonceError::Expired => "expired",
        }
    }

    /// Log the error with appropriate level
    ///
    /// Only the category is logged, never token contents.
    pub(crate) fn log(&self) {
        match self {
            NonceError::Config(e) => {
                tracing::error!(error = %e, "Nonce configuration error");
            }
            NonceError::InvalidSubject(_) | NonceError::PepperTooLong { .. } => {
                tracing::warn!(reason = self.reason(), "Refusing to issue nonce");
            }
            _ => {
                tracing::debug!(reason = self.reason(), "Nonce rejected");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_config_is_fatal() {
        assert!(NonceError::Config(ConfigError::Missing("CIPHER_KEY")).is_fatal());
        assert!(!NonceError::Expired.is_fatal());
        assert!(!NonceError::Crypto(CipherError::AeadFailure).is_fatal());
        assert!(!NonceError::Decode(DecodeError::NotUtf8).is_fatal());
    }

    #[test]
    fn test_display_does_not_leak_detail() {
        assert_eq!(
            NonceError::Crypto(CipherError::AeadFailure).to_string(),
            "Cipher error: aead operation failed"
        );
        assert_eq!(
            NonceError::InvalidSubject('|').to_string(),
            "Subject name must not contain '|'"
        );
    }

    #[test]
    fn test_reason_categories() {
        assert_eq!(NonceError::Expired.reason(), "expired");
        assert_eq!(NonceError::IdentityMismatch.reason(), "identity");
        assert_eq!(NonceError::from(DecodeError::NotUtf8).reason(), "decode");
    }
}
