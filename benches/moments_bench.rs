use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use momenta::{Accumulator, LongVariance, Moments, Order, Variance};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::hint::black_box;

const CHUNK: usize = 1_000;

fn data(size: usize) -> Vec<f64> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(0xC0FFEE);
    (0..size).map(|_| rng.gen_range(-100.0..100.0)).collect()
}

/// 1. BATCH CONSTRUCTION (scaling test with multiple sizes and orders)
fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("moments/of");
    for &size in &[100, 1_000, 10_000, 100_000] {
        let values = data(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("second", size), &values, |b, values| {
            b.iter(|| black_box(Moments::of(Order::Second, black_box(values))))
        });
        group.bench_with_input(BenchmarkId::new("fourth", size), &values, |b, values| {
            b.iter(|| black_box(Moments::of(Order::Fourth, black_box(values))))
        });
    }
    group.finish();
}

/// 2. STREAMING ACCEPT (per-element cost by order)
fn bench_accept(c: &mut Criterion) {
    let values = data(10_000);
    let mut group = c.benchmark_group("moments/accept");
    group.throughput(Throughput::Elements(values.len() as u64));

    for (name, order) in [("first", Order::First), ("fourth", Order::Fourth)] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &values, |b, values| {
            b.iter(|| {
                let mut m = Moments::new(order);
                for &x in values {
                    m.accept(x);
                }
                black_box(m)
            })
        });
    }
    group.finish();
}

/// 3. PAIRWISE COMBINE (fold of pre-built chunk accumulators)
fn bench_combine(c: &mut Criterion) {
    let values = data(100 * CHUNK);
    let parts: Vec<Moments> = values
        .chunks(CHUNK)
        .map(|chunk| Moments::of(Order::Fourth, chunk))
        .collect();

    c.bench_function("moments/combine_100_chunks", |b| {
        b.iter(|| {
            let mut acc = Moments::new(Order::Fourth);
            for p in &parts {
                acc.combine(black_box(p));
            }
            black_box(acc)
        })
    });
}

/// 4. FLOAT VS EXACT VARIANCE on integer data
fn bench_variance(c: &mut Criterion) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
    let ints: Vec<i64> = (0..10_000).map(|_| rng.gen_range(-1_000_000..1_000_000)).collect();
    let floats: Vec<f64> = ints.iter().map(|&x| x as f64).collect();

    let mut group = c.benchmark_group("variance");
    group.throughput(Throughput::Elements(ints.len() as u64));
    group.bench_function("float", |b| {
        b.iter(|| black_box(Variance::of(black_box(&floats)).as_f64()))
    });
    group.bench_function("exact", |b| {
        b.iter(|| black_box(LongVariance::of(black_box(&ints)).as_f64()))
    });
    group.finish();
}

criterion_group!(benches, bench_batch, bench_accept, bench_combine, bench_variance);
criterion_main!(benches);
