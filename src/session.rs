//! Client-side experiment consumption
//!
//! An [`ExperimentSession`] is what a page or request handler holds: the shared
//! registry, the backend, and optionally the [`SsrData`] the server embedded.
//! Asking it for an experiment returns the SSR value or the cached value if one
//! exists, and otherwise runs resolution once and caches the result.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use trueno_ab::backend::FixedBackend;
//! use trueno_ab::experiment::ExperimentDefinition;
//! use trueno_ab::registry::{RegisterOptions, Registry};
//! use trueno_ab::session::ExperimentSession;
//!
//! # async fn example() -> trueno_ab::Result<()> {
//! let registry = Arc::new(Registry::new());
//! registry.register_experiments(
//!     [("checkout", ExperimentDefinition::new("exp-checkout", 2)?)],
//!     RegisterOptions::default(),
//! );
//!
//! let session = ExperimentSession::new(Arc::clone(&registry), FixedBackend::new(1));
//! assert!(session.state("checkout")?.loading);
//!
//! let state = session.resolve("checkout").await?;
//! assert_eq!(state.variant, Some(1));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::backend::VariantBackend;
use crate::experiment::RegisteredExperiment;
use crate::registry::Registry;
use crate::selection::VariantSet;
use crate::ssr::SsrData;
use crate::Result;

/// Snapshot of one experiment as seen by a consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantState {
    /// Variant to use, once known
    pub variant: Option<usize>,
    /// True while no variant is known
    pub loading: bool,
    /// Set when the resolved variant could not be cached because the
    /// experiment was removed meanwhile. Resolution itself never fails; backend
    /// errors and timeouts surface as variant `0`.
    pub error: Option<String>,
    /// True when the variant came from server-side rendering data
    pub is_ssr: bool,
}

/// Registry + backend + optional SSR data for one client or request.
#[derive(Debug)]
pub struct ExperimentSession<B> {
    registry: Arc<Registry>,
    backend: B,
    ssr: Option<SsrData>,
}

impl<B: VariantBackend> ExperimentSession<B> {
    /// Create a session without SSR data.
    #[must_use]
    pub const fn new(registry: Arc<Registry>, backend: B) -> Self {
        Self {
            registry,
            backend,
            ssr: None,
        }
    }

    /// Use variants precomputed by the server.
    #[must_use]
    pub fn with_ssr(mut self, ssr: SsrData) -> Self {
        self.ssr = Some(ssr);
        self
    }

    /// Shared registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Backend used for resolution.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    fn ssr_variant(&self, name: &str) -> Option<usize> {
        self.ssr.as_ref().and_then(|ssr| ssr.get(name))
    }

    /// Current state without resolving.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRegistered`](crate::Error::NotRegistered) for unknown names
    pub fn state(&self, name: &str) -> Result<VariantState> {
        let experiment = self.registry.get_experiment(name)?;
        let ssr_variant = self.ssr_variant(name);
        let variant = ssr_variant.or_else(|| experiment.selected_variant());

        Ok(VariantState {
            variant,
            loading: variant.is_none(),
            error: None,
            is_ssr: ssr_variant.is_some(),
        })
    }

    /// Resolve `name` unless a variant is already known, and cache the result.
    ///
    /// When SSR is enabled the known variant is acknowledged to the backend.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRegistered`](crate::Error::NotRegistered) for unknown names
    pub async fn resolve(&self, name: &str) -> Result<VariantState> {
        let experiment = self.registry.get_experiment(name)?;
        let ssr_variant = self.ssr_variant(name);

        let (variant, error) = match ssr_variant.or_else(|| experiment.selected_variant()) {
            Some(known) => (known, None),
            None => {
                let loaded = self
                    .registry
                    .load_variant(&self.backend, &experiment, experiment.id())
                    .await;
                let error = self
                    .registry
                    .set_selected_index(name, loaded)
                    .err()
                    .map(|e| e.to_string());
                (loaded, error)
            }
        };

        self.acknowledge(name, &experiment, variant);

        Ok(VariantState {
            variant: Some(variant),
            loading: false,
            error,
            is_ssr: ssr_variant.is_some(),
        })
    }

    /// Drop the cached variant and resolve again.
    ///
    /// Useful when an earlier attempt degraded to `0` after a backend error or
    /// timeout. A variant from SSR data still takes precedence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRegistered`](crate::Error::NotRegistered) for unknown names
    pub async fn retry(&self, name: &str) -> Result<VariantState> {
        self.registry.forget_selected_index(name)?;
        self.resolve(name).await
    }

    /// Resolve `name` and map it onto `options`.
    ///
    /// Returns the position of the chosen option.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRegistered`](crate::Error::NotRegistered) for unknown
    /// names and [`Error::VariantCountMismatch`](crate::Error::VariantCountMismatch)
    /// when `options` does not cover the registered variant count
    pub async fn choose(&self, name: &str, options: &VariantSet) -> Result<usize> {
        let experiment = self.registry.get_experiment(name)?;
        options.validate(&experiment)?;

        let state = self.resolve(name).await?;
        Ok(state
            .variant
            .and_then(|variant| options.pick(variant))
            .unwrap_or(0))
    }

    fn acknowledge(&self, name: &str, experiment: &RegisteredExperiment, variant: usize) {
        if !self.registry.is_ssr_enabled() {
            return;
        }
        if self.registry.logging_enabled() {
            tracing::info!(experiment = name, id = experiment.id(), variant, "(SSR) setting variant");
        }
        self.backend.set_variant(experiment.id(), variant);
    }
}
