//! Haar butterfly: the pairwise sum/difference primitive on a 1D sequence.
//! no_std + alloc compatible

extern crate alloc;
use alloc::vec;
use core::f64::consts::FRAC_1_SQRT_2;

use crate::error::HaarError;

/// Scaling convention of the butterfly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Normalization {
    /// Scale by `1/√2` in both directions; preserves signal energy.
    #[default]
    Orthonormal,
    /// Scale by `1/2` on analysis and leave synthesis unscaled.
    Average,
}

impl Normalization {
    /// `true` selects [`Normalization::Orthonormal`], `false` [`Normalization::Average`].
    pub fn from_orthonormal(orthonormal: bool) -> Self {
        if orthonormal {
            Normalization::Orthonormal
        } else {
            Normalization::Average
        }
    }

    pub fn is_orthonormal(self) -> bool {
        matches!(self, Normalization::Orthonormal)
    }

    /// Factor applied to each sum/difference on the forward pass.
    pub fn analysis_scale(self) -> f64 {
        match self {
            Normalization::Orthonormal => FRAC_1_SQRT_2,
            Normalization::Average => 0.5,
        }
    }

    /// Factor applied to each sum/difference on the inverse pass.
    pub fn synthesis_scale(self) -> f64 {
        match self {
            Normalization::Orthonormal => FRAC_1_SQRT_2,
            Normalization::Average => 1.0,
        }
    }
}

#[inline]
fn check_len(n: usize) -> Result<(), HaarError> {
    if n < 2 || n % 2 != 0 {
        return Err(HaarError::InvalidDimension { len: n });
    }
    Ok(())
}

/// Single-level forward butterfly, in place.
///
/// Pair `(x[2i], x[2i+1])` becomes `x[i] = (a+b)·s` and `x[i + n/2] = (a-b)·s`.
pub fn forward(sequence: &mut [f64], normalization: Normalization) -> Result<(), HaarError> {
    let mut scratch = vec![0.0; sequence.len()];
    forward_with_scratch(sequence, &mut scratch, normalization)
}

/// Single-level inverse butterfly, in place. Exact inverse of [`forward`].
pub fn inverse(sequence: &mut [f64], normalization: Normalization) -> Result<(), HaarError> {
    let mut scratch = vec![0.0; sequence.len()];
    inverse_with_scratch(sequence, &mut scratch, normalization)
}

/// Forward butterfly using a caller-provided scratch buffer of at least `sequence.len()`.
pub fn forward_with_scratch(
    sequence: &mut [f64],
    scratch: &mut [f64],
    normalization: Normalization,
) -> Result<(), HaarError> {
    let n = sequence.len();
    check_len(n)?;
    if scratch.len() < n {
        return Err(HaarError::ShapeMismatch {
            expected: n,
            actual: scratch.len(),
        });
    }
    let half = n / 2;
    let s = normalization.analysis_scale();
    let (sums, diffs) = scratch[..n].split_at_mut(half);
    for (i, pair) in sequence.chunks_exact(2).enumerate() {
        let (a, b) = (pair[0], pair[1]);
        sums[i] = (a + b) * s;
        diffs[i] = (a - b) * s;
    }
    sequence.copy_from_slice(&scratch[..n]);
    Ok(())
}

/// Inverse butterfly using a caller-provided scratch buffer of at least `sequence.len()`.
pub fn inverse_with_scratch(
    sequence: &mut [f64],
    scratch: &mut [f64],
    normalization: Normalization,
) -> Result<(), HaarError> {
    let n = sequence.len();
    check_len(n)?;
    if scratch.len() < n {
        return Err(HaarError::ShapeMismatch {
            expected: n,
            actual: scratch.len(),
        });
    }
    let half = n / 2;
    let s = normalization.synthesis_scale();
    let (sums, diffs) = sequence.split_at(half);
    for (i, pair) in scratch[..n].chunks_exact_mut(2).enumerate() {
        pair[0] = (sums[i] + diffs[i]) * s;
        pair[1] = (sums[i] - diffs[i]) * s;
    }
    sequence.copy_from_slice(&scratch[..n]);
    Ok(())
}
