use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use matmul_recursive::{Matrix, Multiplier, ParallelConfig, Variant, multiply_naive};

fn bench_variants(c: &mut Criterion) {
    let mut group = c.benchmark_group("matmul");
    group.sample_size(10);

    for size in [64, 128, 256] {
        let a = Matrix::row_ramp(size);
        let b = Matrix::column_ramp(size);

        group.bench_with_input(BenchmarkId::new("naive", size), &size, |bench, &size| {
            let mut result = Matrix::zeros(size);
            bench.iter(|| multiply_naive(&mut result, black_box(&a), black_box(&b)).unwrap());
        });

        for variant in Variant::all(ParallelConfig::default()) {
            group.bench_with_input(
                BenchmarkId::new(variant.to_string(), size),
                &size,
                |bench, &size| {
                    let mut result = Matrix::zeros(size);
                    bench.iter(|| {
                        variant
                            .multiply(&mut result, black_box(&a), black_box(&b))
                            .unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_variants);
criterion_main!(benches);
