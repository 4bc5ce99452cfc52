//! Criterion micro-benchmarks for network construction and indexing.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fishpass_bench::{barriers_every, random_network};
use fishpass_network::NetworkModel;
use fishpass_passage::BarrierIndex;

/// Benchmark: build and validate a 100K-reach network.
fn bench_build_100k(c: &mut Criterion) {
    let reaches = random_network(100_000, 9);
    c.bench_function("network_build_100k", |b| {
        b.iter(|| black_box(NetworkModel::build(&reaches).unwrap()));
    });
}

/// Benchmark: index 10K barriers.
fn bench_barrier_index_10k(c: &mut Criterion) {
    let reaches = random_network(100_000, 9);
    let barriers = barriers_every(&reaches, 10, 0.7);
    c.bench_function("barrier_index_10k", |b| {
        b.iter(|| black_box(BarrierIndex::build(&barriers, None).unwrap()));
    });
}

criterion_group!(benches, bench_build_100k, bench_barrier_index_10k);
criterion_main!(benches);
