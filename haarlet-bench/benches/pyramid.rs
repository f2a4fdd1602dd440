use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use haarlet::{butterfly, pyramid, Normalization};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_grid(n: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..n * n).map(|_| rng.gen_range(0.0..255.0)).collect()
}

fn bench_butterfly(c: &mut Criterion) {
    let row = random_grid(32);
    c.bench_function("butterfly_1024", |b| {
        b.iter(|| {
            let mut v = row.clone();
            butterfly::forward(&mut v, Normalization::Orthonormal).unwrap();
            butterfly::inverse(&mut v, Normalization::Orthonormal).unwrap();
        })
    });
}

fn bench_pyramid(c: &mut Criterion) {
    let mut group = c.benchmark_group("pyramid_roundtrip");
    for &n in &[64usize, 256, 512] {
        let data = random_grid(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| {
                let (coeffs, sizes) =
                    pyramid::forward(data, n, n, 4, Normalization::Orthonormal).unwrap();
                pyramid::inverse(&coeffs, n, n, 4, Normalization::Orthonormal, &sizes).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_butterfly, bench_pyramid);
criterion_main!(benches);
