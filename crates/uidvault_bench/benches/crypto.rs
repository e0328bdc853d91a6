//! AEAD engine benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use uidvault_bench::{random_data, SIZES};
use uidvault_core::crypto::{NONCE_SIZE, TAG_SIZE};
use uidvault_core::{AeadAlgorithm, EncryptionKey};

const ALGORITHMS: [AeadAlgorithm; 2] = [AeadAlgorithm::Aes256Gcm, AeadAlgorithm::ChaCha20Poly1305];

/// Benchmark encryption for both engines.
fn bench_encrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("encrypt");
    let key = EncryptionKey::generate();
    let nonce = [7u8; NONCE_SIZE];

    for algorithm in ALGORITHMS {
        let engine = algorithm.engine();
        for size in SIZES {
            group.throughput(Throughput::Bytes(size as u64));
            let plaintext = random_data(size);
            let mut out = vec![0u8; size + TAG_SIZE];

            group.bench_with_input(
                BenchmarkId::new(algorithm.to_string(), size),
                &plaintext,
                |b, plaintext| {
                    b.iter(|| {
                        engine
                            .encrypt(key.as_bytes(), &nonce, b"aad", black_box(plaintext), &mut out)
                            .unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

/// Benchmark decryption for both engines.
fn bench_decrypt(c: &mut Criterion) {
    let mut group = c.benchmark_group("decrypt");
    let key = EncryptionKey::generate();
    let nonce = [7u8; NONCE_SIZE];

    for algorithm in ALGORITHMS {
        let engine = algorithm.engine();
        for size in SIZES {
            group.throughput(Throughput::Bytes(size as u64));
            let mut ciphertext = vec![0u8; size + TAG_SIZE];
            engine
                .encrypt(key.as_bytes(), &nonce, b"aad", &random_data(size), &mut ciphertext)
                .unwrap();
            let mut out = vec![0u8; size];

            group.bench_with_input(
                BenchmarkId::new(algorithm.to_string(), size),
                &ciphertext,
                |b, ciphertext| {
                    b.iter(|| {
                        engine
                            .decrypt(key.as_bytes(), &nonce, b"aad", black_box(ciphertext), &mut out)
                            .unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_encrypt, bench_decrypt);
criterion_main!(benches);
