//! Engine configuration
//!
//! Process-wide knobs applied when a [`Registry`](crate::registry::Registry) is built.
//! Every field has a default, so partial JSON documents and partial environments work.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{Error, Result};

/// Default time to wait for a backend before falling back to variant 0.
pub const DEFAULT_TIMEOUT_MS: u64 = 1500;

/// Environment variable overriding [`EngineConfig::timeout_ms`].
pub const ENV_TIMEOUT_MS: &str = "TRUENO_AB_TIMEOUT_MS";
/// Environment variable overriding [`EngineConfig::logging`].
pub const ENV_LOGGING: &str = "TRUENO_AB_LOGGING";
/// Environment variable overriding [`EngineConfig::disabled`].
pub const ENV_DISABLED: &str = "TRUENO_AB_DISABLED";

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum time (ms) to wait for the backend
    pub timeout_ms: u64,
    /// Trace resolution decisions
    pub logging: bool,
    /// Always resolve to variant 0
    pub disabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            logging: false,
            disabled: false,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the document is malformed
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build from `TRUENO_AB_*` environment variables on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is set but cannot be parsed
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injected lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a value is set but cannot be parsed
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            config.timeout_ms = raw
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("{ENV_TIMEOUT_MS}={raw}: {e}")))?;
        }
        if let Some(raw) = lookup(ENV_LOGGING) {
            config.logging = parse_flag(ENV_LOGGING, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DISABLED) {
            config.disabled = parse_flag(ENV_DISABLED, &raw)?;
        }

        Ok(config)
    }

    /// Timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::Config(format!("{key}={other}: expected a boolean"))),
    }
}
