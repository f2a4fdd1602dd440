use haarlet::metrics::{compression_ratio, nonzero_count, psnr};
use haarlet::threshold::{threshold_in_place, thresholded};
use haarlet::{HaarError, IntensityBuffer, Session};
use proptest::prelude::*;

fn checker(w: usize, h: usize) -> IntensityBuffer {
    let data = (0..w * h)
        .map(|i| {
            let (x, y) = (i % w, i / w);
            ((x * 13 + y * 31) % 256) as f64
        })
        .collect();
    IntensityBuffer::from_vec(w, h, data).unwrap()
}

#[test]
/// Literal 4x4 buffer with three nonzero entries compresses 16:3.
fn compression_ratio_literal_example() {
    let mut coeffs = vec![0.0; 16];
    coeffs[0] = 120.0;
    coeffs[5] = -3.5;
    coeffs[15] = 0.25;
    let nz = nonzero_count(&coeffs);
    assert_eq!(nz, 3);
    let ratio = compression_ratio(coeffs.len(), nz);
    assert!((ratio - 5.33).abs() < 0.01, "{ratio}");
}

#[test]
/// Epsilon zero is lossless: MSE ~ 0 and, for the averaging path, PSNR is infinite.
fn zero_epsilon_is_lossless() {
    let session = Session::new();
    let ctx = session.prepare(checker(16, 16));
    let fwd = session.run_forward(&ctx, 2, 0.0, false).unwrap();
    assert_eq!(fwd.report.zeroed, 0);
    let recon = session
        .run_inverse(&ctx, &fwd.coefficients, &fwd.level_sizes, 2, false)
        .unwrap();
    let report = session.compare(ctx.source(), &recon).unwrap();
    assert_eq!(report.mse, 0.0);
    assert_eq!(report.psnr, f64::INFINITY);
    assert_eq!(psnr(0.0), f64::INFINITY);
}

#[test]
/// On the orthonormal path epsilon zero leaves only float residue: PSNR stays far above any lossy level.
fn zero_epsilon_orthonormal_is_near_lossless() {
    let session = Session::new();
    let ctx = session.prepare(checker(16, 16));
    let fwd = session.run_forward(&ctx, 2, 0.0, true).unwrap();
    let recon = session
        .run_inverse(&ctx, &fwd.coefficients, &fwd.level_sizes, 2, true)
        .unwrap();
    let report = session.compare(ctx.source(), &recon).unwrap();
    assert!(report.mse < 1e-20, "{}", report.mse);
    assert!(report.psnr > 250.0, "{}", report.psnr);
}

#[test]
/// Sweeping coefficients that were already thresholded is refused instead of mislabelled.
fn sweep_refuses_thresholded_coefficients() {
    let session = Session::new();
    let ctx = session.prepare(checker(16, 16));
    let sparse = session.run_forward(&ctx, 2, 60.0, true).unwrap();
    assert_eq!(
        session.sweep(&ctx, &sparse.coefficients, &[0.0]),
        Err(HaarError::NotPristine)
    );
    let pristine = session.run_forward(&ctx, 2, 0.0, true).unwrap();
    let points = session.sweep(&ctx, &pristine.coefficients, &[0.0]).unwrap();
    assert!(points[0].report.mse < 1e-20);
}

#[test]
/// Larger epsilon never increases the nonzero count of fixed coefficients.
fn nonzero_count_is_monotone_in_epsilon() {
    let session = Session::new();
    let ctx = session.prepare(checker(32, 32));
    let fwd = session.run_forward(&ctx, 3, 0.0, true).unwrap();
    let mut last = usize::MAX;
    for eps in [0.0, 1.0, 10.0, 20.0, 40.0, 60.0, 1e9] {
        let (t, _) = thresholded(fwd.coefficients.data(), eps);
        let nz = nonzero_count(&t);
        assert!(nz <= last, "eps={eps}: {nz} > {last}");
        last = nz;
    }
    assert_eq!(last, 0);
}

#[test]
/// Thresholding twice at the same epsilon changes nothing the second time.
fn thresholding_is_idempotent() {
    let session = Session::new();
    let ctx = session.prepare(checker(16, 16));
    let mut fwd = session.run_forward(&ctx, 2, 20.0, true).unwrap();
    let once = fwd.coefficients.data().to_vec();
    fwd.coefficients.threshold(20.0);
    assert_eq!(fwd.coefficients.data(), once.as_slice());
}

#[test]
/// Sparsified coefficients reconstruct lossily, and quality drops as epsilon grows.
fn psnr_degrades_with_epsilon() {
    let session = Session::new();
    let ctx = session.prepare(checker(32, 32));
    let fwd = session.run_forward(&ctx, 2, 0.0, true).unwrap();
    let points = session
        .sweep(&ctx, &fwd.coefficients, &[5.0, 40.0, 400.0])
        .unwrap();
    assert!(points.windows(2).all(|p| p[0].report.mse <= p[1].report.mse));
    assert!(points[2].report.psnr.is_finite());
}

proptest! {
    #[test]
    fn prop_monotone(ref coeffs in proptest::collection::vec(-500.0f64..500.0, 1..128), a in 0.0f64..300.0, b in 0.0f64..300.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let mut x = coeffs.clone();
        let mut y = coeffs.clone();
        threshold_in_place(&mut x, lo);
        threshold_in_place(&mut y, hi);
        prop_assert!(nonzero_count(&y) <= nonzero_count(&x));
    }
}
