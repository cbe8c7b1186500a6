use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use concurrent_heavykeeper::{Config, TopK};
use rand::prelude::*;

// Benchmark TopK::list() with a large k, where the sorted copy dominates.
fn benchmark_topk_list(c: &mut Criterion) {
    let mut rng = rand::rng();

    let k = 5_000;
    let width = 10_000;
    let depth = 4;
    let decay = 0.95;

    let topk = TopK::new(Config::new(k, width, depth, decay, 1, 4)).unwrap();

    // Fill the structure with more than k distinct keys so the heap is full
    // and list() operates on O(k) entries.
    for _ in 0..(k * 2) {
        let key: u64 = rng.random();
        topk.add(key.to_le_bytes().to_vec()).unwrap();
    }
    topk.drain();

    let mut group = c.benchmark_group("TopK_list");
    group.sample_size(40);
    group.bench_function("list_k_5000", |b| {
        b.iter(|| {
            black_box(topk.list());
        });
    });
    group.finish();
}

criterion_group!(benches, benchmark_topk_list);
criterion_main!(benches);
