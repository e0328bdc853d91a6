//! Secure object store benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use tempfile::TempDir;
use uidvault_bench::{generate_uids, open_store, random_data, SIZES};
use uidvault_core::{AeadAlgorithm, EncryptionKey, Uid};
use uidvault_storage::{DirKvBackend, InMemoryKvBackend};

/// Benchmark put into an in-memory store.
fn bench_memory_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_put");

    for algorithm in [AeadAlgorithm::Aes256Gcm, AeadAlgorithm::ChaCha20Poly1305] {
        for size in SIZES {
            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(
                BenchmarkId::new(algorithm.to_string(), size),
                &size,
                |b, &size| {
                    let store =
                        open_store(Arc::new(InMemoryKvBackend::new()), algorithm).unwrap();
                    let key = EncryptionKey::generate();
                    let data = random_data(size);
                    let mut next = 0u64;

                    b.iter(|| {
                        next += 1;
                        store
                            .put(Uid::new(next % 1024), &key, black_box(&data), b"")
                            .unwrap();
                    });
                },
            );
        }
    }

    group.finish();
}

/// Benchmark get from an in-memory store.
fn bench_memory_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_get");

    for size in SIZES {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let kv = Arc::new(InMemoryKvBackend::new());
            let store = open_store(kv, AeadAlgorithm::Aes256Gcm).unwrap();
            let key = EncryptionKey::generate();
            let uids = generate_uids(100);
            for uid in &uids {
                store.put(*uid, &key, &random_data(size), b"").unwrap();
            }
            let mut i = 0;

            b.iter(|| {
                let uid = uids[i % uids.len()];
                i += 1;
                black_box(store.get(uid, &key, b"").unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark put into a directory store.
fn bench_dir_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("dir_put");

    // Each put syncs two files
    group.sample_size(20);

    for size in [256, 4096] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let temp_dir = TempDir::new().unwrap();
            let backend = DirKvBackend::open(&temp_dir.path().join("store")).unwrap();
            let store = open_store(Arc::new(backend), AeadAlgorithm::Aes256Gcm).unwrap();
            let key = EncryptionKey::generate();
            let data = random_data(size);
            let mut next = 0u64;

            b.iter(|| {
                next += 1;
                store
                    .put(Uid::new(next % 64), &key, black_box(&data), b"")
                    .unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_memory_put, bench_memory_get, bench_dir_put);
criterion_main!(benches);
