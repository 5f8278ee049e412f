use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn scenario() -> sim_core::Params {
    sim_core::Params {
        capex_automation: 600_000.0,
        capex_integration: 800_000.0,
        ..Default::default()
    }
}

fn bench_path(c: &mut Criterion) {
    let params = scenario();
    c.bench_function("single path 8y", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        b.iter(|| black_box(sim_runtime::simulate(&params, &mut rng)))
    });
}

fn bench_ensemble(c: &mut Criterion) {
    let params = scenario();
    let cfg = sim_core::RunConfig {
        seed: 42,
        runs: 1000,
    };
    c.bench_function("ensemble 1000 runs + summary", |b| {
        b.iter(|| black_box(sim_runtime::run_and_summarize(&params, &cfg)))
    });
}

criterion_group!(benches, bench_path, bench_ensemble);
criterion_main!(benches);
