//! Key-value backend benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tempfile::TempDir;
use uidvault_bench::{random_data, SIZES};
use uidvault_storage::{DirKvBackend, InMemoryKvBackend, KvBackend};

/// Benchmark in-memory set operations.
fn bench_inmemory_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("inmemory_set");

    for size in SIZES {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let backend = InMemoryKvBackend::new();
            let data = random_data(size);

            b.iter(|| backend.set("bench_key", black_box(&data)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark directory get operations, checksum verification included.
fn bench_dir_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("dir_get");

    for size in SIZES {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let temp_dir = TempDir::new().unwrap();
            let backend = DirKvBackend::open(&temp_dir.path().join("store")).unwrap();
            backend.set("bench_key", &random_data(size)).unwrap();

            b.iter(|| black_box(backend.get(black_box("bench_key")).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_inmemory_set, bench_dir_get);
criterion_main!(benches);
