//! Execution context
//!
//! Server and browser behaviour differs in three places: query-string forcing
//! (browser only), hydration and SSR variant assignment (server only). The
//! context is passed explicitly instead of being sniffed from the environment.

use serde::{Deserialize, Serialize};
use url::Url;

/// Base that relative browser paths are resolved against.
const BASE_URL: &str = "http://localhost";

/// The parts of a browser location the engine reads.
///
/// `search` and `hash` keep their leading `?` and `#`, like `window.location`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    search: String,
    hash: String,
}

impl Location {
    /// Create a location from its search and hash components.
    #[must_use]
    pub fn new(search: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            hash: hash.into(),
        }
    }

    /// Split a full URL (or path) into search and hash components.
    ///
    /// Paths are resolved against `http://localhost`. The components come out
    /// percent-encoded the way a browser reports them, and an empty query or
    /// fragment gives `""`. An unparseable URL gives an empty location.
    ///
    /// ```rust
    /// use trueno_ab::context::Location;
    ///
    /// let loc = Location::from_url("https://example.com/app?force=3#/page?variant=1");
    /// assert_eq!(loc.search(), "?force=3");
    /// assert_eq!(loc.hash(), "#/page?variant=1");
    /// ```
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let parsed = match Url::parse(BASE_URL).and_then(|base| base.join(url)) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(url, error = %e, "unparseable browser URL - no query overrides");
                return Self::default();
            }
        };

        let search = parsed
            .query()
            .filter(|q| !q.is_empty())
            .map_or_else(String::new, |q| format!("?{q}"));
        let hash = parsed
            .fragment()
            .filter(|f| !f.is_empty())
            .map_or_else(String::new, |f| format!("#{f}"));

        Self { search, hash }
    }

    /// Get the search component, including the leading `?` if present.
    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Get the hash component, including the leading `#` if present.
    #[must_use]
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

/// Where the engine is running.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionContext {
    /// Rendering a request on the server
    #[default]
    Server,
    /// Running in a browser tab at the given location
    Browser(Location),
}

impl ExecutionContext {
    /// Browser context for a URL.
    #[must_use]
    pub fn browser(url: &str) -> Self {
        Self::Browser(Location::from_url(url))
    }

    /// True when running on the server.
    #[must_use]
    pub const fn is_server(&self) -> bool {
        matches!(self, Self::Server)
    }

    /// Browser location, if any.
    #[must_use]
    pub const fn location(&self) -> Option<&Location> {
        match self {
            Self::Server => None,
            Self::Browser(location) => Some(location),
        }
    }
}
