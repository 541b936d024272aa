//! Resolution benchmarks
//!
//! Measures the overhead the engine adds on top of the backend: the cached path,
//! the forced path, the full race against an immediate backend, and SSR
//! assignment for a page with many experiments.
//!
//! Run with: cargo bench --bench resolution

use std::collections::HashMap;
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trueno_ab::backend::FixedBackend;
use trueno_ab::context::ExecutionContext;
use trueno_ab::experiment::ExperimentDefinition;
use trueno_ab::registry::{RegisterOptions, Registry};
use trueno_ab::session::ExperimentSession;

fn registry_with(context: ExecutionContext, experiments: usize, options: RegisterOptions) -> Registry {
    let registry = Registry::builder().context(context).build();
    registry.register_experiments(
        (0..experiments).map(|i| {
            let definition = ExperimentDefinition::builder(format!("id-{i}"), 4)
                .testing_id(i64::try_from(i).unwrap_or_default())
                .build()
                .unwrap();
            (format!("exp-{i}"), definition)
        }),
        options,
    );
    registry
}

/// Benchmark the three resolution paths
fn bench_load_variant(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("load_variant");

    let server = registry_with(ExecutionContext::Server, 1, RegisterOptions::default());
    let experiment = server.get_experiment("exp-0").unwrap();
    let backend = FixedBackend::new(2);
    let (server, experiment, backend_ref) = (&server, &experiment, &backend);
    group.bench_function("race_immediate_backend", |b| {
        b.to_async(&runtime)
            .iter(|| async move { server.load_variant(backend_ref, black_box(experiment), "id-0").await });
    });

    let browser = registry_with(
        ExecutionContext::browser("https://shop.test/?force=0&variant=1"),
        1,
        RegisterOptions::default(),
    );
    let forced = browser.get_experiment("exp-0").unwrap();
    let (browser, forced) = (&browser, &forced);
    group.bench_function("forced_query", |b| {
        b.to_async(&runtime)
            .iter(|| async move { browser.load_variant(backend_ref, black_box(forced), "id-0").await });
    });

    let cached = Arc::new(registry_with(ExecutionContext::Server, 1, RegisterOptions::default()));
    cached.set_selected_index("exp-0", 3).unwrap();
    let session = ExperimentSession::new(Arc::clone(&cached), backend);
    let session = &session;
    group.bench_function("session_cached", |b| {
        b.to_async(&runtime)
            .iter(|| async move { session.resolve(black_box("exp-0")).await.unwrap() });
    });

    group.finish();
}

/// Benchmark SSR assignment across page sizes
fn bench_ssr_variants(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_ssr_variants");

    for size in [1usize, 10, 100] {
        let registry = registry_with(ExecutionContext::Server, size, RegisterOptions::ssr());
        let cookies = HashMap::<String, String>::new();
        group.bench_with_input(BenchmarkId::new("new_visitor", size), &registry, |b, registry| {
            b.iter(|| registry.get_ssr_variants(black_box(&cookies), |_, _| {}).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_load_variant, bench_ssr_variants);
criterion_main!(benches);
