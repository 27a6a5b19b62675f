//! Benchmarks for controllable state evaluation and writes.
//!
//! Run with: `cargo bench --package ctrlstate --bench controllable_bench`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ctrlstate::{ControllableState, OnChange, Runtime, StateProps};
use std::hint::black_box;

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    group.bench_function("uncontrolled_idle", |b| {
        let rt = Runtime::new();
        let state = ControllableState::new(&rt);
        b.iter(|| {
            rt.render(|| black_box(state.evaluate(StateProps::uncontrolled().default_value(0u64))))
        });
    });

    group.bench_function("controlled_idle", |b| {
        let rt = Runtime::new();
        let state = ControllableState::new(&rt);
        b.iter(|| rt.render(|| black_box(state.evaluate(StateProps::controlled(7u64)))));
    });

    group.finish();
}

fn bench_write_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_cycle");

    for writes in [1usize, 8, 64] {
        group.bench_with_input(
            BenchmarkId::new("uncontrolled", writes),
            &writes,
            |b, &writes| {
                let rt = Runtime::new();
                let state = ControllableState::new(&rt);
                let on_change = OnChange::new(|v: &u64| {
                    black_box(*v);
                });
                let props = || {
                    StateProps::uncontrolled()
                        .default_value(0u64)
                        .with_on_change(on_change.clone())
                };
                let (_, mut set) = rt.render(|| state.evaluate(props()));
                b.iter(|| {
                    for _ in 0..writes {
                        set.update(|prev| prev.wrapping_add(1));
                    }
                    let (value, next) = rt.render(|| state.evaluate(props()));
                    set = next;
                    black_box(value)
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("controlled", writes),
            &writes,
            |b, &writes| {
                let rt = Runtime::new();
                let state = ControllableState::new(&rt);
                let on_change = OnChange::new(|v: &u64| {
                    black_box(*v);
                });
                let (_, set) = rt.render(|| {
                    state.evaluate(StateProps::controlled(1u64).with_on_change(on_change.clone()))
                });
                b.iter(|| {
                    for _ in 0..writes {
                        set.update(|prev| prev + 1);
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_write_cycle);
criterion_main!(benches);
