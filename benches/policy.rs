use criterion::{black_box, criterion_group, criterion_main, Criterion};

use envaware::{EnvironmentState, PolicyEngine};

fn seeded_state(extra_tokens: usize) -> EnvironmentState {
    let mut state = EnvironmentState::new();
    state.observe(["Windows", "PowerShell", "PandocInstalled"], 0.8).unwrap();
    for i in 0..extra_tokens {
        state.reinforce(&format!("Tool{i}"), 0.1).unwrap();
    }
    state
}

fn bench_policy(c: &mut Criterion) {
    let mut group = c.benchmark_group("policy");

    let engine = PolicyEngine::default();
    let snapshot = seeded_state(64).snapshot();
    group.bench_function("decide", |b| {
        b.iter(|| engine.decide(black_box(&snapshot), black_box("brief.md")));
    });

    group.bench_function("decay_64_tokens", |b| {
        let mut state = seeded_state(64);
        b.iter(|| state.decay(black_box(0.05)).unwrap());
    });

    group.bench_function("snapshot_64_tokens", |b| {
        let state = seeded_state(64);
        b.iter(|| black_box(state.snapshot()));
    });

    group.finish();
}

criterion_group!(benches, bench_policy);
criterion_main!(benches);
