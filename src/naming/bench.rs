use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;

// Reference the main crate
extern crate gridstore;

// Import the derivation function from the main crate
use gridstore::naming::derive_name;

// Generate a random label of specified word count
fn generate_random_label(words: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    let mut s = String::new();

    for w in 0..words {
        if w > 0 {
            s.push(' ');
        }
        let len = rng.gen_range(3..12);
        for _ in 0..len {
            let idx = rng.gen_range(0..CHARSET.len());
            s.push(CHARSET[idx] as char);
        }
    }

    s
}

// Benchmark derivation with short labels
pub fn bench_short_labels(c: &mut Criterion) {
    let s = generate_random_label(2);

    let mut group = c.benchmark_group("ShortLabels");
    group.bench_function("derive_name", |b: &mut criterion::Bencher| {
        b.iter(|| derive_name(black_box(&s)))
    });
    group.finish();
}

// Benchmark derivation with long punctuated labels
pub fn bench_long_labels(c: &mut Criterion) {
    let s = generate_random_label(24).replace(' ', " -- ");

    let mut group = c.benchmark_group("LongLabels");
    group.bench_function("derive_name", |b: &mut criterion::Bencher| {
        b.iter(|| derive_name(black_box(&s)))
    });
    group.finish();
}

criterion_group!(benches, bench_short_labels, bench_long_labels);
criterion_main!(benches);
