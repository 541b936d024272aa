//! In-process backends.
//!
//! Useful for local development, demos, and as the backend of last resort when
//! no experimentation platform is configured.

use std::time::Duration;

use anyhow::anyhow;
use dashmap::DashMap;

use super::VariantBackend;

/// Backend that answers every experiment with the same variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedBackend {
    variant: usize,
    delay: Option<Duration>,
}

impl FixedBackend {
    /// Always answer `variant`, immediately.
    #[must_use]
    pub const fn new(variant: usize) -> Self {
        Self {
            variant,
            delay: None,
        }
    }

    /// Wait `delay` before answering.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl VariantBackend for FixedBackend {
    async fn get_variant(&self, _experiment_id: &str) -> anyhow::Result<usize> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.variant)
    }
}

/// Backend with a per-experiment variant table.
///
/// Unknown IDs fail, which the engine turns into variant `0`. Variants
/// acknowledged through [`VariantBackend::set_variant`] are recorded and can be
/// inspected with [`acknowledged`](Self::acknowledged).
#[derive(Debug, Default)]
pub struct MemoryBackend {
    variants: DashMap<String, usize>,
    acknowledged: DashMap<String, usize>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the variant returned for `experiment_id`.
    pub fn insert(&self, experiment_id: impl Into<String>, variant: usize) {
        self.variants.insert(experiment_id.into(), variant);
    }

    /// Variant last acknowledged for `experiment_id`.
    #[must_use]
    pub fn acknowledged(&self, experiment_id: &str) -> Option<usize> {
        self.acknowledged.get(experiment_id).map(|v| *v.value())
    }
}

impl VariantBackend for MemoryBackend {
    async fn get_variant(&self, experiment_id: &str) -> anyhow::Result<usize> {
        self.variants
            .get(experiment_id)
            .map(|v| *v.value())
            .ok_or_else(|| anyhow!("no variant configured for '{experiment_id}'"))
    }

    fn set_variant(&self, experiment_id: &str, variant: usize) {
        self.acknowledged.insert(experiment_id.to_string(), variant);
    }
}
