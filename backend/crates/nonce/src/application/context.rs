//! Request Context
//!
//! What the HTTP layer knows about the current request, passed explicitly to
//! the form and session guards.

use std::collections::HashMap;
use std::net::IpAddr;

use platform::client::{ClientFingerprint, resolve_client_address};

/// Per-request input to the guards
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub client: ClientFingerprint,
    /// Submitted form fields
    pub payload: HashMap<String, String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context from what the transport reports
    ///
    /// The client address is the first valid `X-Forwarded-For` entry, falling
    /// back to the peer address.
    pub fn from_transport(
        forwarded_for: Option<&str>,
        peer: Option<IpAddr>,
        user_agent: Option<&str>,
    ) -> Self {
        Self {
            client: ClientFingerprint::new(
                resolve_client_address(forwarded_for, peer),
                user_agent.map(str::to_string),
            ),
            payload: HashMap::new(),
        }
    }

    pub fn with_client_address(mut self, address: impl Into<String>) -> Self {
        self.client.address = Some(address.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.client.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const PEER: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

    #[test]
    fn test_from_transport_prefers_forwarded_for() {
        let ctx = RequestContext::from_transport(
            Some("203.0.113.7, 10.0.0.1"),
            Some(PEER),
            Some("Mozilla/5.0"),
        );
        assert_eq!(ctx.client.address.as_deref(), Some("203.0.113.7"));
        assert_eq!(ctx.client.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[test]
    fn test_from_transport_falls_back_to_peer() {
        let ctx = RequestContext::from_transport(Some("not-an-ip"), Some(PEER), None);
        assert_eq!(ctx.client.address.as_deref(), Some("10.0.0.2"));
        assert!(ctx.client.user_agent.is_none());

        let ctx = RequestContext::from_transport(None, None, None);
        assert!(ctx.client.address.is_none());
    }

    #[test]
    fn test_fields() {
        let ctx = RequestContext::new().with_field("__nonce", "abc");
        assert_eq!(ctx.field("__nonce"), Some("abc"));
        assert_eq!(ctx.field("missing"), None);
    }
}
