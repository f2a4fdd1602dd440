//! Hard thresholding (sparsification) of coefficient buffers.

extern crate alloc;
use alloc::vec::Vec;

/// Zero every coefficient whose magnitude is strictly below `epsilon`.
///
/// Returns the number of coefficients zeroed. An `epsilon` that is not
/// strictly positive (including NaN) leaves the buffer untouched.
pub fn threshold_in_place(coefficients: &mut [f64], epsilon: f64) -> usize {
    if epsilon.is_nan() || epsilon <= 0.0 {
        return 0;
    }
    let mut zeroed = 0;
    for c in coefficients.iter_mut() {
        if libm::fabs(*c) < epsilon {
            *c = 0.0;
            zeroed += 1;
        }
    }
    zeroed
}

/// Non-destructive variant of [`threshold_in_place`].
pub fn thresholded(coefficients: &[f64], epsilon: f64) -> (Vec<f64>, usize) {
    let mut out = coefficients.to_vec();
    let zeroed = threshold_in_place(&mut out, epsilon);
    (out, zeroed)
}
