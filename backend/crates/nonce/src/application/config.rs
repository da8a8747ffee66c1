//! Application Configuration
//!
//! One symmetric key per process, plus the defaults the form and session
//! guards fall back to. TTL, salt and pepper length remain per-call values;
//! these structs only hold the defaults.

use platform::cipher::{CipherError, CipherKey};
use platform::crypto::from_base64;

use crate::domain::value_objects::NoncePolicy;
use crate::error::ConfigError;

/// Environment variable holding the base64 cipher key
pub const CIPHER_KEY_ENV: &str = "CIPHER_KEY";

const SECONDS_PER_DAY: i64 = 86_400;

/// Defaults for form nonces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDefaults {
    /// Time for a form submission to live (seconds)
    pub ttl_seconds: i64,
    pub salt: String,
    pub pepper_length: usize,
    /// Name of the hidden nonce field
    pub nonce_key: String,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            ttl_seconds: 3600,
            salt: "_".to_string(),
            pepper_length: 2,
            nonce_key: "__nonce".to_string(),
        }
    }
}

impl FormDefaults {
    pub fn policy(&self) -> NoncePolicy {
        NoncePolicy::new(self.ttl_seconds, self.salt.clone(), self.pepper_length)
    }
}

/// Defaults for session nonces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDefaults {
    /// Session lifetime in days
    pub ttl_days: i64,
    pub salt: String,
    pub pepper_length: usize,
    /// Prefix of the session store keys
    pub prefix: String,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            ttl_days: 7,
            salt: "_".to_string(),
            pepper_length: 3,
            prefix: "__".to_string(),
        }
    }
}

impl SessionDefaults {
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_days.saturating_mul(SECONDS_PER_DAY)
    }

    pub fn policy(&self) -> NoncePolicy {
        NoncePolicy::new(self.ttl_seconds(), self.salt.clone(), self.pepper_length)
    }
}

/// Nonce configuration
#[derive(Debug, Clone)]
pub struct NonceConfig {
    /// Process-wide cipher key (never logged)
    pub cipher_key: CipherKey,
    pub form: FormDefaults,
    pub session: SessionDefaults,
}

impl NonceConfig {
    pub fn new(cipher_key: CipherKey) -> Self {
        Self {
            cipher_key,
            form: FormDefaults::default(),
            session: SessionDefaults::default(),
        }
    }

    /// Config from a base64-encoded key
    pub fn from_base64(encoded: &str) -> Result<Self, ConfigError> {
        load_cipher_key(encoded).map(Self::new)
    }

    /// Config from the `CIPHER_KEY` environment variable
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Config from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let encoded = lookup(CIPHER_KEY_ENV)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(CIPHER_KEY_ENV))?;
        Self::from_base64(&encoded)
    }

    /// Config with a random key (for development)
    pub fn development() -> Self {
        Self::new(CipherKey::generate())
    }
}

/// Decode and length-check a base64 cipher key
pub fn load_cipher_key(encoded: &str) -> Result<CipherKey, ConfigError> {
    let bytes = from_base64(encoded.trim()).map_err(|_| ConfigError::InvalidBase64)?;
    let key = CipherKey::from_slice(&bytes).map_err(|e| match e {
        CipherError::InvalidKeyLength { expected, got } => {
            ConfigError::InvalidKeyLength { expected, got }
        }
        _ => ConfigError::InvalidBase64,
    })?;

    tracing::info!(key_bytes = bytes.len(), "Loaded cipher key");
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::cipher::{KEY_LEN, get_key};

    #[test]
    fn test_load_valid_key() {
        let encoded = get_key(KEY_LEN);
        let config = NonceConfig::from_base64(&encoded).unwrap();
        assert_eq!(config.cipher_key.expose_secret().len(), KEY_LEN);
        assert_eq!(config.form, FormDefaults::default());
    }

    #[test]
    fn test_wrong_length_key_is_config_error() {
        // 64-byte key
        let encoded = "lKKL2UuzmHKdBB1vHDFzNzCiTei6jWOTDdE7tJPPMGYQpnohGQUhVduwZTSP1ESyUcLMUPhPhCCEuSYGIJr0gw==";
        assert_eq!(
            NonceConfig::from_base64(encoded).unwrap_err(),
            ConfigError::InvalidKeyLength {
                expected: KEY_LEN,
                got: 64
            }
        );
    }

    #[test]
    fn test_bad_base64_is_config_error() {
        assert_eq!(
            NonceConfig::from_base64("not base64!").unwrap_err(),
            ConfigError::InvalidBase64
        );
    }

    #[test]
    fn test_missing_key() {
        assert_eq!(
            NonceConfig::from_lookup(|_| None).unwrap_err(),
            ConfigError::Missing(CIPHER_KEY_ENV)
        );
        assert_eq!(
            NonceConfig::from_lookup(|_| Some("  ".to_string())).unwrap_err(),
            ConfigError::Missing(CIPHER_KEY_ENV)
        );
    }

    #[test]
    fn test_lookup_reads_cipher_key_variable() {
        let encoded = get_key(KEY_LEN);
        let config = NonceConfig::from_lookup(|name| {
            (name == CIPHER_KEY_ENV).then(|| encoded.clone())
        });
        assert!(config.is_ok());
    }

    #[test]
    fn test_session_ttl_in_days() {
        let defaults = SessionDefaults::default();
        assert_eq!(defaults.ttl_seconds(), 7 * 86_400);
        assert_eq!(defaults.policy().pepper_length, 3);
        assert_eq!(FormDefaults::default().policy().ttl_seconds, 3600);
    }

    #[test]
    fn test_debug_never_prints_key() {
        let config = NonceConfig::from_base64(&get_key(KEY_LEN)).unwrap();
        assert!(format!("{:?}", config).contains("REDACTED"));
    }
}
