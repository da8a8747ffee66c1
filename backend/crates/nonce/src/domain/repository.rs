//! Repository Traits
//!
//! Interfaces for session persistence. Implementations live in the
//! infrastructure layer.

/// Key/value session storage scoped to one client
pub trait SessionStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: String);

    /// Delete a value
    fn remove(&self, key: &str);

    /// Delete every value
    fn clear(&self);
}
