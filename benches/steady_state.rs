use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use surfkin::prelude::*;

fn benchmark_steady_state(c: &mut Criterion) {
    let params = ParameterSet::baseline();
    let setup = SteadyStateSetup::analysis();

    c.bench_function("derivatives", |b| {
        let system = SurfaceSystem::new(&params).unwrap();
        let state = CoverageState::new(0.9, 0.05, 0.01);
        b.iter(|| black_box(system.derivatives(black_box(&state))));
    });

    c.bench_function("steady_state_baseline", |b| {
        b.iter(|| black_box(simulate_to_steady_state(black_box(&params), black_box(&setup))));
    });

    c.bench_function("steady_state_hot", |b| {
        let hot = params.at_temperature(900.0);
        b.iter(|| black_box(simulate_to_steady_state(black_box(&hot), black_box(&setup))));
    });
}

fn benchmark_analyses(c: &mut Criterion) {
    let params = ParameterSet::baseline();
    let setup = SteadyStateSetup::analysis();
    let temperatures = linspace(550.0, 700.0, 4);

    let mut group = c.benchmark_group("analyses");
    group.sample_size(10);

    group.bench_function("arrhenius_scan", |b| {
        b.iter(|| black_box(arrhenius_scan(&params, black_box(&temperatures), &setup)));
    });

    group.bench_function("drc", |b| {
        b.iter(|| black_box(compute_drc(&params, &Step::ALL, 0.01, &setup)));
    });

    group.finish();
}

criterion_group!(benches, benchmark_steady_state, benchmark_analyses);
criterion_main!(benches);
