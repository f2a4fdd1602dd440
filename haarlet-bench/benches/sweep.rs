use criterion::{criterion_group, criterion_main, Criterion};
use haarlet::{IntensityBuffer, Session};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn bench_sweep(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(11);
    let data = (0..256 * 256).map(|_| rng.gen_range(0.0..255.0)).collect();
    let source = IntensityBuffer::from_vec(256, 256, data).unwrap();
    let session = Session::new();
    let ctx = session.prepare(source);
    let pristine = session.run_forward(&ctx, 3, 0.0, true).unwrap();
    let epsilons = [5.0, 10.0, 20.0, 40.0, 80.0];

    c.bench_function("sweep_256_l3", |b| {
        b.iter(|| session.sweep(&ctx, &pristine.coefficients, &epsilons).unwrap())
    });
}

criterion_group!(benches, bench_sweep);
criterion_main!(benches);
