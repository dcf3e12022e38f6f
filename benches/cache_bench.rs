//! Benchmarks for the file cache.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use file_cache::{Cache, CacheConfig};

fn bench_cache(root: &std::path::Path, namespace: &str) -> Cache {
    let config = CacheConfig::builder()
        .cache_root(root)
        .user("bench")
        .namespace(namespace)
        .cache_depth(2)
        .build()
        .unwrap();
    Cache::new(config)
}

/// Benchmark the hot-path operations against a populated namespace.
fn bench_single_threaded(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_threaded");

    let root = tempfile::tempdir().unwrap();
    let cache = bench_cache(root.path(), "reads");

    // Pre-populate some keys
    for i in 0..1_000 {
        cache
            .set(&format!("key_{}", i), &format!("value_{}", i))
            .unwrap();
    }

    group.bench_function("get_existing", |b| {
        let mut i = 0;
        b.iter(|| {
            let key = format!("key_{}", i % 1_000);
            black_box(cache.get::<String>(&key).unwrap());
            i += 1;
        });
    });

    group.bench_function("get_missing", |b| {
        let mut i = 0;
        b.iter(|| {
            let key = format!("missing_{}", i);
            black_box(cache.get::<String>(&key).unwrap());
            i += 1;
        });
    });

    group.bench_function("contains", |b| {
        let mut i = 0;
        b.iter(|| {
            let key = format!("key_{}", i % 1_000);
            black_box(cache.contains(&key).unwrap());
            i += 1;
        });
    });

    group.bench_function("set_new", |b| {
        let root = tempfile::tempdir().unwrap();
        let cache = bench_cache(root.path(), "writes");
        let mut i = 0;
        b.iter(|| {
            cache.set(&format!("new_key_{}", i), "value").unwrap();
            i += 1;
        });
    });

    group.bench_function("set_existing", |b| {
        let mut i = 0;
        b.iter(|| {
            let key = format!("key_{}", i % 1_000);
            cache.set(&key, "replacement").unwrap();
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark the subtree sweeps that maintenance runs lean on.
fn bench_sweeps(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweeps");
    group.sample_size(20);

    let root = tempfile::tempdir().unwrap();
    let cache = bench_cache(root.path(), "sweeps");
    for i in 0..500 {
        cache
            .set(&format!("key_{}", i), &format!("value_{}", i))
            .unwrap();
    }

    group.bench_function("size", |b| {
        b.iter(|| black_box(cache.size().unwrap()));
    });

    group.bench_function("purge_nothing_stale", |b| {
        b.iter(|| black_box(cache.purge().unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_single_threaded, bench_sweeps);
criterion_main!(benches);
