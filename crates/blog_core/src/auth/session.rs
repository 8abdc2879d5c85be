//! Session flag storage seen by the authorization gate.
//!
//! The cookie/session transport lives outside the core; the gate only needs
//! get/set/remove of boolean flags by key.

use std::collections::HashMap;

/// Key of the flag set by a successful admin login.
pub const LOGGED_IN_KEY: &str = "logged_in";

/// Per-request view of the caller's session.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<bool>;
    fn set(&mut self, key: &str, value: bool);
    fn remove(&mut self, key: &str);
}

/// In-memory session for tests and single-process embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    values: HashMap<String, bool>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a session that already carries the logged-in flag.
    pub fn logged_in() -> Self {
        let mut session = Self::new();
        session.set(LOGGED_IN_KEY, true);
        session
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<bool> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}
