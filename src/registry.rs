//! Experiment registry
//!
//! The registry is the explicit context object every other operation runs
//! against: it owns the experiment definitions, their cached variants, and the
//! process-wide flags (`disabled`, logging, timeout, SSR). Create one at startup,
//! share it through an `Arc`, and call [`Registry::clean_state`] between tests.
//!
//! # Example
//!
//! ```rust
//! use trueno_ab::experiment::ExperimentDefinition;
//! use trueno_ab::registry::{RegisterOptions, Registry};
//!
//! let registry = Registry::builder().timeout_ms(500).build();
//! registry.register_experiments(
//!     [("checkout", ExperimentDefinition::new("exp-checkout", 2)?)],
//!     RegisterOptions::default(),
//! );
//!
//! let checkout = registry.get_experiment("checkout")?;
//! assert_eq!(checkout.id(), "exp-checkout");
//! assert_eq!(checkout.selected_variant(), None);
//! # Ok::<(), trueno_ab::Error>(())
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use crate::config::{EngineConfig, DEFAULT_TIMEOUT_MS};
use crate::context::ExecutionContext;
use crate::cookie::CookieSource;
use crate::experiment::{ExperimentDefinition, RegisteredExperiment};
use crate::{Error, Result};

/// Options for [`Registry::register_experiments`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Enable server-side rendering support and hydrate from cookies
    pub enable_ssr: bool,
}

impl RegisterOptions {
    /// Options with SSR enabled.
    #[must_use]
    pub const fn ssr() -> Self {
        Self { enable_ssr: true }
    }
}

/// Registry of experiments and engine-wide flags.
pub struct Registry {
    pub(crate) experiments: DashMap<String, RegisteredExperiment>,
    disabled: AtomicBool,
    logging: AtomicBool,
    timeout_ms: AtomicU64,
    ssr_enabled: AtomicBool,
    context: ExecutionContext,
    pub(crate) cookies: Option<Arc<dyn CookieSource>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("experiments", &self.names())
            .field("disabled", &self.is_disabled())
            .field("logging", &self.logging_enabled())
            .field("timeout_ms", &self.timeout_ms())
            .field("ssr_enabled", &self.is_ssr_enabled())
            .field("context", &self.context)
            .field("cookies", &self.cookies.is_some())
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Registry {
    /// Create an empty server-side registry with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry builder
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Merge experiment definitions into the registry.
    ///
    /// Names not in `experiments` are kept. Every name in `experiments` starts
    /// over with no selected variant, even if it was registered before. With
    /// `options.enable_ssr`, SSR is switched on and the registry hydrates from
    /// its cookie source.
    pub fn register_experiments<I, N>(&self, experiments: I, options: RegisterOptions)
    where
        I: IntoIterator<Item = (N, ExperimentDefinition)>,
        N: Into<String>,
    {
        for (name, definition) in experiments {
            let name = name.into();
            if self.logging_enabled() {
                tracing::debug!(experiment = %name, id = definition.id(), "registered experiment");
            }
            self.experiments.insert(name, RegisteredExperiment::new(definition));
        }

        if options.enable_ssr {
            self.ssr_enabled.store(true, Ordering::SeqCst);
            self.hydrate();
        }
    }

    /// Get a snapshot of a registered experiment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRegistered`] if `name` was never registered
    pub fn get_experiment(&self, name: &str) -> Result<RegisteredExperiment> {
        self.experiments
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::NotRegistered(name.to_string()))
    }

    /// Cache a variant for `name`. The index is not checked against the variant count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotRegistered`] if `name` was never registered
    pub fn set_selected_index(&self, name: &str, index: usize) -> Result<()> {
        let mut entry = self
            .experiments
            .get_mut(name)
            .ok_or_else(|| Error::NotRegistered(name.to_string()))?;
        entry.select(index);
        Ok(())
    }

    /// Drop the cached variant for `name` so the next resolution asks again.
    pub(crate) fn forget_selected_index(&self, name: &str) -> Result<()> {
        let mut entry = self
            .experiments
            .get_mut(name)
            .ok_or_else(|| Error::NotRegistered(name.to_string()))?;
        entry.forget();
        Ok(())
    }

    /// Resolve every experiment to variant 0 from now on. There is no way back.
    pub fn disable(&self) {
        self.disabled.store(true, Ordering::SeqCst);
    }

    /// True once [`disable`](Self::disable) was called.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    /// Maximum time to wait for the backend, applied to later resolutions.
    pub fn set_variant_timeout(&self, timeout_ms: u64) {
        self.timeout_ms.store(timeout_ms, Ordering::SeqCst);
    }

    /// Current timeout in milliseconds.
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms.load(Ordering::SeqCst)
    }

    /// Current timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms())
    }

    /// Trace resolution decisions.
    pub fn enable_logging(&self) {
        self.logging.store(true, Ordering::SeqCst);
    }

    /// True once [`enable_logging`](Self::enable_logging) was called.
    #[must_use]
    pub fn logging_enabled(&self) -> bool {
        self.logging.load(Ordering::SeqCst)
    }

    /// True once an SSR registration happened.
    #[must_use]
    pub fn is_ssr_enabled(&self) -> bool {
        self.ssr_enabled.load(Ordering::SeqCst)
    }

    /// Execution context this registry runs in.
    #[must_use]
    pub const fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Registered experiment names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.experiments.iter().map(|e| e.key().clone()).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered experiments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    /// Forget every experiment and reset `disabled`, logging, and the timeout.
    ///
    /// Intended for test isolation. SSR stays enabled if it was.
    pub fn clean_state(&self) {
        self.experiments.clear();
        self.disabled.store(false, Ordering::SeqCst);
        self.logging.store(false, Ordering::SeqCst);
        self.timeout_ms.store(DEFAULT_TIMEOUT_MS, Ordering::SeqCst);
    }
}

/// Builder for [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    context: ExecutionContext,
    cookies: Option<Arc<dyn CookieSource>>,
    config: EngineConfig,
}

impl RegistryBuilder {
    /// Set the execution context (server by default).
    #[must_use]
    pub fn context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    /// Set the cookie source read during hydration.
    #[must_use]
    pub fn cookies(mut self, cookies: impl CookieSource + 'static) -> Self {
        self.cookies = Some(Arc::new(cookies));
        self
    }

    /// Apply a whole configuration.
    #[must_use]
    pub const fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the backend timeout in milliseconds.
    #[must_use]
    pub const fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.timeout_ms = timeout_ms;
        self
    }

    /// Enable or disable decision tracing.
    #[must_use]
    pub const fn logging(mut self, logging: bool) -> Self {
        self.config.logging = logging;
        self
    }

    /// Start disabled.
    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.config.disabled = disabled;
        self
    }

    /// Build the registry
    #[must_use]
    pub fn build(self) -> Registry {
        Registry {
            experiments: DashMap::new(),
            disabled: AtomicBool::new(self.config.disabled),
            logging: AtomicBool::new(self.config.logging),
            timeout_ms: AtomicU64::new(self.config.timeout_ms),
            ssr_enabled: AtomicBool::new(false),
            context: self.context,
            cookies: self.cookies,
        }
    }
}
