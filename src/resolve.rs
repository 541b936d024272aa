//! Variant resolution
//!
//! Decision order, first match wins:
//!
//! 1. Registry disabled: variant `0`.
//! 2. Browser URL forces the experiment's testing ID: the forced variant.
//! 3. Backend raced against the registry timeout:
//!    backend value, or `0` on backend error, or `0` on timeout.
//!
//! Resolution never fails. Failures are logged and degrade to variant `0`.

use std::future::Future;
use std::time::Duration;

use crate::backend::VariantBackend;
use crate::experiment::RegisteredExperiment;
use crate::query::QueryParams;
use crate::registry::Registry;
use crate::Error;

/// Variant every failure path falls back to.
pub const FALLBACK_VARIANT: usize = 0;

/// Outcome of [`race_timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled<T> {
    /// The future finished first
    Completed(T),
    /// The timer fired first
    TimedOut,
}

/// Race `future` against a timer of `limit`, cancelling whichever loses.
///
/// When the future wins the timer is dropped; when the timer wins the future is
/// dropped and any result it would have produced is discarded. A future that is
/// already ready wins even with a zero limit.
pub async fn race_timeout<F>(future: F, limit: Duration) -> Settled<F::Output>
where
    F: Future,
{
    match tokio::time::timeout(limit, future).await {
        Ok(output) => Settled::Completed(output),
        Err(_elapsed) => Settled::TimedOut,
    }
}

impl Registry {
    /// Resolve the variant of `experiment`, asking `backend` for `id` if needed.
    ///
    /// Does not cache the result; see [`Registry::set_selected_index`].
    pub async fn load_variant<B>(&self, backend: &B, experiment: &RegisteredExperiment, id: &str) -> usize
    where
        B: VariantBackend,
    {
        let logging = self.logging_enabled();

        if self.is_disabled() {
            if logging {
                tracing::info!(id, "[Experiment] experiments disabled - defaulting to 0");
            }
            return FALLBACK_VARIANT;
        }

        if let Some(variant) = self.forced_variant(experiment) {
            if logging {
                tracing::info!(id, variant, "[Experiment] forcing variant");
            }
            return variant;
        }

        let timeout_ms = self.timeout_ms();
        match race_timeout(backend.get_variant(id), Duration::from_millis(timeout_ms)).await {
            Settled::Completed(Ok(variant)) => {
                if logging {
                    tracing::info!(id, variant, "[Experiment] selected variant");
                }
                variant
            }
            Settled::Completed(Err(e)) => {
                let failure = Error::BackendFailure {
                    id: id.to_string(),
                    reason: format!("{e:#}"),
                };
                tracing::error!(id, error = %failure, "[Experiment] backend failed - defaulting to 0");
                FALLBACK_VARIANT
            }
            Settled::TimedOut => {
                if logging {
                    let timeout = Error::TimeoutExceeded {
                        id: id.to_string(),
                        timeout_ms,
                    };
                    tracing::warn!(id, timeout_ms, error = %timeout, "[Experiment] request timed out - defaulting to 0");
                }
                FALLBACK_VARIANT
            }
        }
    }

    /// Variant forced by the browser URL for `experiment`, if any.
    ///
    /// Always `None` on the server and for experiments without a testing ID.
    #[must_use]
    pub fn forced_variant(&self, experiment: &RegisteredExperiment) -> Option<usize> {
        let testing_id = experiment.testing_id()?;
        let location = self.context().location()?;

        QueryParams::from_location(location).forced_variant(testing_id)
    }
}
