use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use pi_sieve::algs::accumulate::partial_sum;
use pi_sieve::algs::partition::IterationRange;
use pi_sieve::prelude::*;

fn bench_partial_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("partial_sum");
    for &n in &[840u64, 100_000, 10_000_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let range = IterationRange::new(1, n);
            b.iter(|| partial_sum(black_box(&range), n))
        });
    }
    group.finish();
}

fn bench_local_world(c: &mut Criterion) {
    let mut group = c.benchmark_group("local_world_estimate");
    let cfg = PiConfig::default().with_iterations(1_680_000);
    for &ranks in &[1usize, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(ranks), &ranks, |b, &ranks| {
            let world = LocalWorld::new(ranks).unwrap();
            b.iter(|| world.run(|me, comm| estimate_pi(&me, &cfg, comm)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_partial_sum, bench_local_world);
criterion_main!(benches);
