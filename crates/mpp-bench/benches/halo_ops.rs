//! Criterion micro-benchmarks for halo updates and plan construction.

use std::time::{Duration, Instant};

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mpp_bench::{random_field, reference_spec};
use mpp_comm::{launch, MppContext, Pelist};
use mpp_core::Rank;
use mpp_domain::{define_domain, update_halo, update_halo_pair, Domain, Field, UpdateOptions};
use mpp_test_utils::test_config;

/// Benchmark: one full-halo update of a 360x180x1 field on a single rank
/// (every halo cell is self-fed through the cyclic and fold edges).
fn bench_update_single_rank(c: &mut Criterion) {
    let mut ctx = MppContext::single(test_config()).unwrap();
    let domain = define_domain(&ctx, &reference_spec(1).unwrap()).unwrap();
    let mut field: Field<f64> = random_field(&domain, 1, 42).unwrap();
    let opts = UpdateOptions::default();

    c.bench_function("halo_update_360x180_1rank", |b| {
        b.iter(|| {
            update_halo(&mut ctx, &domain, &mut field, &opts).unwrap();
            black_box(&field);
        });
    });
}

/// Benchmark: vector-pair update of a 360x180x10 field on a single rank.
fn bench_update_pair_levels(c: &mut Criterion) {
    let mut ctx = MppContext::single(test_config()).unwrap();
    let domain = define_domain(&ctx, &reference_spec(1).unwrap()).unwrap();
    let mut u: Field<f32> = random_field(&domain, 10, 1).unwrap();
    let mut v: Field<f32> = random_field(&domain, 10, 2).unwrap();
    let opts = UpdateOptions::default();

    c.bench_function("halo_update_pair_360x180x10_1rank", |b| {
        b.iter(|| {
            update_halo_pair(&mut ctx, &domain, &mut u, &mut v, &opts).unwrap();
            black_box((&u, &v));
        });
    });
}

/// Benchmark: full-halo update on 4 ranks. Each rank times its own loop;
/// the slowest rank's time is reported.
fn bench_update_four_ranks(c: &mut Criterion) {
    let spec = reference_spec(4).unwrap();

    c.bench_function("halo_update_360x180_4ranks", |b| {
        b.iter_custom(|iters| {
            let times = launch(4, test_config(), |ctx| {
                let domain = define_domain(ctx, &spec).unwrap();
                let mut field: Field<f64> =
                    random_field(&domain, 1, u64::from(ctx.rank().0)).unwrap();
                let opts = UpdateOptions::default();
                let world = ctx.world().clone();
                ctx.barrier(&world).unwrap();
                let start = Instant::now();
                for _ in 0..iters {
                    update_halo(ctx, &domain, &mut field, &opts).unwrap();
                }
                start.elapsed()
            })
            .unwrap();
            times.into_iter().max().unwrap_or(Duration::ZERO)
        });
    });
}

/// Benchmark: build one rank's exchange plan on a 16-rank tripolar grid.
fn bench_plan_build(c: &mut Criterion) {
    let spec = reference_spec(16).unwrap();
    let pelist = Pelist::world(16);

    c.bench_function("plan_build_360x180_16ranks", |b| {
        b.iter(|| {
            let d = Domain::define_for(&spec, pelist.clone(), Rank(15)).unwrap();
            black_box(d.plan().recv_count());
        });
    });
}

criterion_group!(
    benches,
    bench_update_single_rank,
    bench_update_pair_levels,
    bench_update_four_ranks,
    bench_plan_build
);
criterion_main!(benches);
