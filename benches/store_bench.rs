//! Benchmarks for LineStore operations

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use linestore::{Store, StoreConfig, SyncMode};
use tempfile::TempDir;

const VALUE: &[u8] = b"the quick brown fox jumps over the lazy dog";

fn populated_store(count: u64) -> (TempDir, Store) {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig::builder()
        .path(temp_dir.path().join("bench.db"))
        .sync_mode(SyncMode::Data)
        .build();
    let store = Store::open_with_config(config).unwrap();
    for _ in 0..count {
        store.set(VALUE).unwrap();
    }
    (temp_dir, store)
}

fn store_benchmarks(c: &mut Criterion) {
    c.bench_function("set", |b| {
        let (_temp, store) = populated_store(0);
        b.iter(|| store.set(black_box(VALUE)).unwrap());
    });

    c.bench_function("get", |b| {
        let (_temp, store) = populated_store(1_000);
        let mut line = 0u64;
        b.iter(|| {
            line = (line + 7) % 1_000;
            black_box(store.get(line).unwrap())
        });
    });

    c.bench_function("list_1000", |b| {
        let (_temp, store) = populated_store(1_000);
        b.iter(|| black_box(store.list().unwrap()));
    });

    c.bench_function("list_reverse_1000", |b| {
        let (_temp, store) = populated_store(1_000);
        b.iter(|| black_box(store.list_reverse().unwrap()));
    });

    c.bench_function("polish_1000", |b| {
        b.iter_batched(
            || populated_store(1_000),
            |(_temp, store)| store.polish().unwrap(),
            BatchSize::PerIteration,
        );
    });
}

criterion_group!(benches, store_benchmarks);
criterion_main!(benches);
