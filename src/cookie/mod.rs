//! Cookie access for SSR persistence
//!
//! The server assigns a variant per experiment and persists it in a cookie named
//! [`cookie_name`]. The same name is read back on later requests and during
//! hydration, so the prefix must never change between client and server.
//!
//! # Example
//!
//! ```rust
//! use trueno_ab::cookie::{cookie_name, CookieSource, MemoryCookieStore};
//!
//! let store = MemoryCookieStore::from_header("theme=dark; _trueno_ab_checkout=1");
//! assert_eq!(store.cookie(&cookie_name("checkout")), Some("1".to_string()));
//! ```

mod memory;

pub use memory::MemoryCookieStore;

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Prefix shared by every experiment cookie.
pub const COOKIE_PREFIX: &str = "_trueno_ab_";

/// Cookie name for an experiment.
#[must_use]
pub fn cookie_name(experiment: &str) -> String {
    format!("{COOKIE_PREFIX}{experiment}")
}

/// Read access to incoming cookies.
pub trait CookieSource: Send + Sync {
    /// Get a cookie value by name.
    ///
    /// Returns `None` if the cookie is absent.
    fn cookie(&self, name: &str) -> Option<String>;
}

impl<S: BuildHasher + Send + Sync> CookieSource for HashMap<String, String, S> {
    fn cookie(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl CookieSource for BTreeMap<String, String> {
    fn cookie(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<T: CookieSource + ?Sized> CookieSource for std::sync::Arc<T> {
    fn cookie(&self, name: &str) -> Option<String> {
        (**self).cookie(name)
    }
}

/// Split a `Cookie` request header into name/value pairs.
///
/// Pairs without `=` are skipped; names and values are trimmed.
pub fn parse_cookie_header(header: &str) -> impl Iterator<Item = (&str, &str)> {
    header.split(';').filter_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        (!name.is_empty()).then(|| (name, value.trim()))
    })
}
