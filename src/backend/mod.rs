//! Experimentation backend adapters
//!
//! A backend is whatever decides variants for real: an experimentation
//! platform, a feature-flag service, a local table. The engine only asks it
//! for an index and enforces its own timeout, so a slow backend never blocks
//! resolution for longer than [`Registry::timeout`](crate::registry::Registry::timeout).
//!
//! # Example
//!
//! ```rust
//! use trueno_ab::backend::{MemoryBackend, VariantBackend};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let backend = MemoryBackend::new();
//! backend.insert("exp-checkout", 1);
//! assert_eq!(backend.get_variant("exp-checkout").await?, 1);
//! # Ok(())
//! # }
//! ```

mod memory;

pub use memory::{FixedBackend, MemoryBackend};

use std::future::Future;
use std::sync::Arc;

/// Source of variant decisions.
pub trait VariantBackend: Send + Sync {
    /// Fetch the variant index for a backend experiment ID.
    ///
    /// Errors are logged by the engine and degrade to variant `0`.
    fn get_variant(&self, experiment_id: &str) -> impl Future<Output = anyhow::Result<usize>> + Send;

    /// Acknowledge a variant chosen on the server.
    ///
    /// Called fire-and-forget when SSR is enabled and a variant is known.
    fn set_variant(&self, _experiment_id: &str, _variant: usize) {}
}

impl<B: VariantBackend> VariantBackend for Arc<B> {
    fn get_variant(&self, experiment_id: &str) -> impl Future<Output = anyhow::Result<usize>> + Send {
        (**self).get_variant(experiment_id)
    }

    fn set_variant(&self, experiment_id: &str, variant: usize) {
        (**self).set_variant(experiment_id, variant);
    }
}
