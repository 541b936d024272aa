//! Error types for Trueno-AB
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)
//!
//! Only setup and misuse errors reach callers. Backend failures and timeouts are
//! absorbed by the resolution algorithm, which degrades to variant `0`.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trueno-AB error types
#[derive(Error, Debug)]
pub enum Error {
    /// Experiment accessed before registration
    #[error("[Experiment] Experiment '{0}' is not registered. Please make sure you call 'register_experiments' as soon as possible in your application")]
    NotRegistered(String),

    /// Server-only operation called outside a server context
    #[error("'{0}' cannot be called on the client")]
    NotServer(&'static str),

    /// SSR operation called without `enable_ssr`
    #[error("SSR is not enabled. Please pass 'RegisterOptions {{ enable_ssr: true }}' to 'register_experiments' to enable SSR")]
    SsrDisabled,

    /// Declared variant options do not match the registered variant count
    #[error("Experiment {id} has an incorrect number of variants. Expected {expected} but got {actual}")]
    VariantCountMismatch {
        /// Backend experiment ID
        id: String,
        /// Registered variant count
        expected: usize,
        /// Number of variant indices declared by the consumer
        actual: usize,
    },

    /// Backend call failed (recovered internally, degrades to variant 0)
    #[error("Backend failure for experiment {id}: {reason}")]
    BackendFailure {
        /// Backend experiment ID
        id: String,
        /// Error reported by the backend adapter
        reason: String,
    },

    /// Backend did not answer in time (recovered internally, degrades to variant 0)
    #[error("Request for experiment {id} timed out after {timeout_ms}ms")]
    TimeoutExceeded {
        /// Backend experiment ID
        id: String,
        /// Timeout that elapsed
        timeout_ms: u64,
    },

    /// Experiment definition rejected at construction
    #[error("Invalid experiment definition: {0}")]
    InvalidDefinition(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
