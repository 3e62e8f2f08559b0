//! Criterion micro-benchmarks for layout solving and partitioning.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mpp_bench::stress_spec;
use mpp_comm::Pelist;
use mpp_core::{Extent, Rank};
use mpp_domain::{balanced_split, solve_layout, Domain};

/// Benchmark: solve layouts for every division count from 1 to 512.
fn bench_solve_layout_sweep(c: &mut Criterion) {
    let global = Extent::new(1, 1440, 1, 1080);

    c.bench_function("solve_layout_1_to_512", |b| {
        b.iter(|| {
            for n in 1..=512 {
                black_box(solve_layout(&global, n).unwrap());
            }
        });
    });
}

/// Benchmark: split 1080 cells into every division count from 1 to 256.
fn bench_balanced_split(c: &mut Criterion) {
    c.bench_function("balanced_split_1080", |b| {
        b.iter(|| {
            for n in 1..=256usize {
                black_box(balanced_split(1080, n));
            }
        });
    });
}

/// Benchmark: define a 1440x1080 domain as seen from each of 64 ranks.
fn bench_define_all_ranks(c: &mut Criterion) {
    let spec = stress_spec(64).unwrap();
    let pelist = Pelist::world(64);

    c.bench_function("define_1440x1080_64ranks", |b| {
        b.iter(|| {
            for r in 0..64u32 {
                let d = Domain::define_for(&spec, pelist.clone(), Rank(r)).unwrap();
                black_box(d.compute_domain().unwrap());
            }
        });
    });
}

criterion_group!(
    benches,
    bench_solve_layout_sweep,
    bench_balanced_split,
    bench_define_all_ranks
);
criterion_main!(benches);
