//! Experiment Session Tests
//!
//! Client-side consumption: caching, SSR replay, backend acknowledgement,
//! and option selection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use trueno_ab::backend::{FixedBackend, MemoryBackend, VariantBackend};
use trueno_ab::context::ExecutionContext;
use trueno_ab::experiment::ExperimentDefinition;
use trueno_ab::registry::{RegisterOptions, Registry};
use trueno_ab::selection::{VariantOption, VariantSet};
use trueno_ab::session::ExperimentSession;
use trueno_ab::{Error, SsrData};

#[derive(Default)]
struct CountingBackend {
    calls: AtomicUsize,
}

impl VariantBackend for CountingBackend {
    async fn get_variant(&self, _experiment_id: &str) -> anyhow::Result<usize> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    }
}

fn registry(options: RegisterOptions) -> Arc<Registry> {
    let registry = Registry::new();
    registry.register_experiments(
        [
            ("hero", ExperimentDefinition::new("exp-hero", 2).unwrap()),
            ("pricing", ExperimentDefinition::new("exp-pricing", 3).unwrap()),
        ],
        options,
    );
    Arc::new(registry)
}

#[tokio::test]
async fn test_resolve_caches_in_registry() {
    let registry = registry(RegisterOptions::default());
    let backend = Arc::new(CountingBackend::default());
    let session = ExperimentSession::new(Arc::clone(&registry), Arc::clone(&backend));

    let before = session.state("hero").unwrap();
    assert!(before.loading);
    assert_eq!(before.variant, None);

    let first = session.resolve("hero").await.unwrap();
    let second = session.resolve("hero").await.unwrap();

    assert_eq!(first.variant, Some(1));
    assert!(!first.loading);
    assert_eq!(second, first);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    assert_eq!(registry.get_experiment("hero").unwrap().selected_variant(), Some(1));
    assert_eq!(session.state("hero").unwrap().variant, Some(1));
}

#[tokio::test]
async fn test_cache_is_shared_across_sessions() {
    let registry = registry(RegisterOptions::default());
    let first = ExperimentSession::new(Arc::clone(&registry), FixedBackend::new(1));
    first.resolve("hero").await.unwrap();

    let backend = Arc::new(CountingBackend::default());
    let second = ExperimentSession::new(Arc::clone(&registry), Arc::clone(&backend));
    assert_eq!(second.resolve("hero").await.unwrap().variant, Some(1));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_ssr_data_skips_resolution() {
    let registry = registry(RegisterOptions::default());
    let backend = Arc::new(CountingBackend::default());
    let mut ssr = SsrData::new();
    ssr.insert("hero", 0);

    let session = ExperimentSession::new(registry, Arc::clone(&backend)).with_ssr(ssr);

    let state = session.state("hero").unwrap();
    assert_eq!(state.variant, Some(0));
    assert!(!state.loading);
    assert!(state.is_ssr);

    let resolved = session.resolve("hero").await.unwrap();
    assert_eq!(resolved.variant, Some(0));
    assert!(resolved.is_ssr);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);

    let other = session.resolve("pricing").await.unwrap();
    assert!(!other.is_ssr);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_known_variant_is_acknowledged_when_ssr_enabled() {
    let registry = registry(RegisterOptions::ssr());
    let backend = Arc::new(MemoryBackend::new());
    backend.insert("exp-pricing", 2);
    let mut ssr = SsrData::new();
    ssr.insert("hero", 1);

    let session = ExperimentSession::new(registry, Arc::clone(&backend)).with_ssr(ssr);
    session.resolve("hero").await.unwrap();
    session.resolve("pricing").await.unwrap();

    assert_eq!(backend.acknowledged("exp-hero"), Some(1));
    assert_eq!(backend.acknowledged("exp-pricing"), Some(2));
}

#[tokio::test]
async fn test_no_acknowledgement_without_ssr() {
    let registry = registry(RegisterOptions::default());
    let backend = Arc::new(MemoryBackend::new());
    backend.insert("exp-hero", 1);

    let session = ExperimentSession::new(registry, Arc::clone(&backend));
    session.resolve("hero").await.unwrap();

    assert_eq!(backend.acknowledged("exp-hero"), None);
}

#[tokio::test]
async fn test_unregistered_name_fails() {
    let session = ExperimentSession::new(registry(RegisterOptions::default()), FixedBackend::new(0));

    assert!(matches!(session.state("ghost"), Err(Error::NotRegistered(_))));
    assert!(matches!(session.resolve("ghost").await, Err(Error::NotRegistered(_))));
}

#[tokio::test(start_paused = true)]
async fn test_retry_asks_backend_again_after_timeout() {
    let registry = registry(RegisterOptions::default());
    registry.set_variant_timeout(100);

    let slow = ExperimentSession::new(
        Arc::clone(&registry),
        FixedBackend::new(1).with_delay(Duration::from_millis(500)),
    );
    assert_eq!(slow.resolve("hero").await.unwrap().variant, Some(0));

    let backend = Arc::new(CountingBackend::default());
    let session = ExperimentSession::new(Arc::clone(&registry), Arc::clone(&backend));
    assert_eq!(session.resolve("hero").await.unwrap().variant, Some(0));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);

    let retried = session.retry("hero").await.unwrap();
    assert_eq!(retried.variant, Some(1));
    assert_eq!(retried.error, None);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    assert_eq!(registry.get_experiment("hero").unwrap().selected_variant(), Some(1));
}

#[tokio::test]
async fn test_retry_keeps_ssr_variant() {
    let registry = registry(RegisterOptions::default());
    let backend = Arc::new(CountingBackend::default());
    let mut ssr = SsrData::new();
    ssr.insert("hero", 0);
    let session = ExperimentSession::new(Arc::clone(&registry), Arc::clone(&backend)).with_ssr(ssr);

    let state = session.retry("hero").await.unwrap();
    assert_eq!(state.variant, Some(0));
    assert!(state.is_ssr);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_retry_after_clean_state_reports_error() {
    let registry = registry(RegisterOptions::default());
    let session = ExperimentSession::new(Arc::clone(&registry), FixedBackend::new(1));

    assert_eq!(session.retry("hero").await.unwrap().error, None);

    registry.clean_state();
    assert!(matches!(session.retry("hero").await, Err(Error::NotRegistered(_))));
}

// =============================================================================
// Option selection
// =============================================================================

#[tokio::test]
async fn test_choose_maps_variant_to_option() {
    let session = ExperimentSession::new(registry(RegisterOptions::default()), FixedBackend::new(2));
    let options = VariantSet::new([VariantOption::Single(0), VariantOption::Many(vec![1, 2])]);

    assert_eq!(session.choose("pricing", &options).await.unwrap(), 1);
}

#[tokio::test]
async fn test_choose_falls_back_to_first_option_for_invalid_index() {
    let session = ExperimentSession::new(registry(RegisterOptions::default()), FixedBackend::new(5));
    let options = VariantSet::new([0usize, 1]);

    assert_eq!(session.choose("hero", &options).await.unwrap(), 0);
}

#[tokio::test]
async fn test_choose_rejects_wrong_option_count() {
    let backend = Arc::new(CountingBackend::default());
    let session = ExperimentSession::new(registry(RegisterOptions::default()), Arc::clone(&backend));
    let options = VariantSet::new([0usize, 1, 2]);

    let err = session.choose("hero", &options).await.unwrap_err();
    assert!(matches!(
        err,
        Error::VariantCountMismatch { expected: 2, actual: 3, .. }
    ));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_forced_variant_through_session() {
    let registry = Registry::builder()
        .context(ExecutionContext::browser("/landing?force=4&variant=1"))
        .timeout_ms(50)
        .build();
    registry.register_experiments(
        [(
            "hero",
            ExperimentDefinition::builder("exp-hero", 2).testing_id(4).build().unwrap(),
        )],
        RegisterOptions::default(),
    );
    let slow = FixedBackend::new(0).with_delay(Duration::from_secs(5));
    let session = ExperimentSession::new(Arc::new(registry), slow);

    assert_eq!(session.resolve("hero").await.unwrap().variant, Some(1));
}
