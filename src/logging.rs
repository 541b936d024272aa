//! Tracing subscriber setup
//!
//! The library only emits `tracing` events. Binaries and tests that want to see
//! them call [`init`] once.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "trueno_ab=info";

/// Install a global fmt subscriber filtered by `RUST_LOG`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
