//! In-memory cookie jar using `DashMap`.
//!
//! Holds one request's cookies on the server, or the tab's cookies in tests.
//! Nothing is persisted.

use super::{parse_cookie_header, CookieSource};
use dashmap::DashMap;

/// In-memory cookie jar backed by a lock-free concurrent hashmap.
///
/// # Example
///
/// ```rust
/// use trueno_ab::cookie::{CookieSource, MemoryCookieStore};
///
/// let jar = MemoryCookieStore::new();
/// jar.set("hello", "world");
/// assert_eq!(jar.cookie("hello"), Some("world".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    store: DashMap<String, String>,
}

impl MemoryCookieStore {
    /// Create an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: DashMap::new(),
        }
    }

    /// Create a jar from a `Cookie` request header.
    #[must_use]
    pub fn from_header(header: &str) -> Self {
        let jar = Self::new();
        for (name, value) in parse_cookie_header(header) {
            jar.set(name, value);
        }
        jar
    }

    /// Set a cookie, overwriting any existing value.
    pub fn set(&self, name: &str, value: impl Into<String>) {
        self.store.insert(name.to_string(), value.into());
    }

    /// Remove a cookie. No-op if absent.
    pub fn delete(&self, name: &str) {
        self.store.remove(name);
    }

    /// Number of cookies in the jar.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the jar is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Clear all cookies.
    pub fn clear(&self) {
        self.store.clear();
    }
}

impl CookieSource for MemoryCookieStore {
    fn cookie(&self, name: &str) -> Option<String> {
        self.store.get(name).map(|v| v.value().clone())
    }
}
