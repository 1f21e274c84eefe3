//! Benchmark for NumBridge marshaling performance.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use numbridge::{
    input_array, io_array, new_array, output_array, ArrayHandle, ElemType, Requirements,
};

/// Build a contiguous float64 handle with `n` elements.
fn sample_array(n: usize) -> ArrayHandle {
    let values: Vec<f64> = (0..n).map(|i| (i as f64 * 0.1).sin()).collect();
    ArrayHandle::from_slice(&values, &[n]).unwrap()
}

/// Build a non-contiguous strided view with `n` logical elements.
fn strided_array(n: usize) -> ArrayHandle {
    sample_array(n * 2).step_by(0, 2).unwrap()
}

fn bench_input_satisfied(c: &mut Criterion) {
    let mut group = c.benchmark_group("input_satisfied");
    for size in [1_000, 10_000, 100_000] {
        let source = sample_array(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, source| {
            b.iter(|| {
                let handle =
                    input_array(black_box(source), ElemType::Float64, Requirements::CONTIGUOUS)
                        .unwrap();
                black_box(handle)
            })
        });
    }
    group.finish();
}

fn bench_input_strided_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("input_strided_copy");
    for size in [1_000, 10_000, 100_000] {
        let source = strided_array(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, source| {
            b.iter(|| {
                let handle =
                    input_array(black_box(source), ElemType::Float64, Requirements::CONTIGUOUS)
                        .unwrap();
                black_box(handle)
            })
        });
    }
    group.finish();
}

fn bench_output_copy_back(c: &mut Criterion) {
    let mut group = c.benchmark_group("output_copy_back_release");
    for size in [1_000, 10_000] {
        let source = sample_array(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, source| {
            b.iter(|| {
                let temp =
                    output_array(black_box(source), ElemType::Float32, Requirements::empty())
                        .unwrap();
                temp.release();
            })
        });
    }
    group.finish();
}

fn bench_io_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("io_roundtrip");
    for size in [1_000, 10_000] {
        let source = strided_array(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, source| {
            b.iter(|| {
                let shadow =
                    io_array(black_box(source), ElemType::Float64, Requirements::CONTIGUOUS)
                        .unwrap();
                shadow.release();
            })
        });
    }
    group.finish();
}

fn bench_new_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("new_array_zeroed");
    for size in [1_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let handle = new_array(None, ElemType::Float64, black_box(&[size])).unwrap();
                black_box(handle)
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_input_satisfied,
    bench_input_strided_copy,
    bench_output_copy_back,
    bench_io_roundtrip,
    bench_new_array
);
criterion_main!(benches);
