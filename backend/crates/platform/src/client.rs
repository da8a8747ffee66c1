//! Client identification utilities
//!
//! Derives the values a session binds to: the client address, reduced to a
//! numeric object id for the session nonce, and the user-agent string kept
//! alongside it for the out-of-band comparison.

use std::net::IpAddr;

use crate::crypto::sha256;

/// Client identity as seen on the current request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientFingerprint {
    /// Client address (as reported by the transport or proxy)
    pub address: Option<String>,
    /// Original User-Agent string
    pub user_agent: Option<String>,
}

impl ClientFingerprint {
    pub fn new(address: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            address,
            user_agent,
        }
    }

    /// Numeric object id for session nonces, see [`address_object_id`]
    ///
    /// A missing address hashes like the empty string.
    pub fn object_id(&self) -> i64 {
        address_object_id(self.address.as_deref().unwrap_or(""))
    }

    /// True iff both address and user agent equal `other`'s
    pub fn matches(&self, other: &ClientFingerprint) -> bool {
        self.address == other.address && self.user_agent == other.user_agent
    }
}

/// Reduce a client address to a non-negative `i64`
///
/// First 8 bytes of SHA-256(address), big-endian, top bit cleared.
pub fn address_object_id(address: &str) -> i64 {
    let digest = sha256(address.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(head) >> 1) as i64
}

/// Pick the client address from an `X-Forwarded-For` value, falling back to
/// the direct connection address
///
/// Only the first entry of the forwarded list is considered, and only when it
/// parses as an IP address.
pub fn resolve_client_address(
    forwarded_for: Option<&str>,
    direct: Option<IpAddr>,
) -> Option<String> {
    forwarded_for
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok())
        .or(direct)
        .map(|ip| ip.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_object_id_is_stable_and_non_negative() {
        let a = address_object_id("192.168.1.1");
        assert_eq!(a, address_object_id("192.168.1.1"));
        assert!(a >= 0);
        assert_ne!(a, address_object_id("192.168.1.2"));
    }

    #[test]
    fn test_address_object_id_known_value() {
        // SHA-256("") = e3b0c44298fc1c14...
        assert_eq!(address_object_id(""), (0xe3b0c44298fc1c14u64 >> 1) as i64);
    }

    #[test]
    fn test_fingerprint_matches() {
        let a = ClientFingerprint::new(Some("10.0.0.1".into()), Some("Mozilla/5.0".into()));
        let b = a.clone();
        let c = ClientFingerprint::new(Some("10.0.0.1".into()), Some("curl/8.0".into()));
        assert!(a.matches(&b));
        assert!(!a.matches(&c));
        assert_eq!(ClientFingerprint::default().object_id(), address_object_id(""));
    }

    #[test]
    fn test_resolve_client_address_xff() {
        let ip = resolve_client_address(Some("192.168.1.1, 10.0.0.1"), None);
        assert_eq!(ip.as_deref(), Some("192.168.1.1"));
    }

    #[test]
    fn test_resolve_client_address_direct() {
        let direct: IpAddr = "127.0.0.1".parse().unwrap();
        assert_eq!(
            resolve_client_address(None, Some(direct)).as_deref(),
            Some("127.0.0.1")
        );
        assert_eq!(
            resolve_client_address(Some("garbage"), Some(direct)).as_deref(),
            Some("127.0.0.1")
        );
        assert_eq!(resolve_client_address(None, None), None);
    }
}
