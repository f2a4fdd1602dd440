//! Fidelity and compaction metrics.
//!
//! PSNR assumes an 8-bit full-scale reference range of `255`.

extern crate alloc;
use alloc::vec::Vec;
use core::fmt;

use crate::error::HaarError;

/// Full-scale value used by [`psnr`].
pub const PEAK: f64 = 255.0;

/// Mean of squared per-element differences.
pub fn mean_squared_error(reference: &[f64], test: &[f64]) -> Result<f64, HaarError> {
    if reference.len() != test.len() {
        return Err(HaarError::ShapeMismatch {
            expected: reference.len(),
            actual: test.len(),
        });
    }
    if reference.is_empty() {
        return Err(HaarError::EmptyInput);
    }
    let sum: f64 = reference
        .iter()
        .zip(test)
        .map(|(a, b)| {
            let e = a - b;
            e * e
        })
        .sum();
    Ok(sum / reference.len() as f64)
}

/// Peak signal-to-noise ratio in decibels; `+∞` when `mse == 0`.
pub fn psnr(mse: f64) -> f64 {
    if mse == 0.0 {
        return f64::INFINITY;
    }
    10.0 * libm::log10(PEAK * PEAK / mse)
}

/// Elements not exactly equal to zero.
pub fn nonzero_count(buffer: &[f64]) -> usize {
    buffer.iter().filter(|&&v| v != 0.0).count()
}

/// `total / max(1, nonzero)`.
pub fn compression_ratio(total: usize, nonzero: usize) -> f64 {
    total as f64 / nonzero.max(1) as f64
}

/// Sum of squares.
pub fn energy(buffer: &[f64]) -> f64 {
    buffer.iter().map(|v| v * v).sum()
}

/// Min-max stretch to `[0, 255]` for visualising coefficients.
///
/// A flat buffer maps every element to `0`.
pub fn normalize_for_display(buffer: &[f64]) -> Vec<u8> {
    let (min, max) = buffer
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;
    let scale = if range != 0.0 && range.is_finite() {
        range
    } else {
        1.0
    };
    buffer
        .iter()
        .map(|&v| libm::round(PEAK * (v - min) / scale).clamp(0.0, PEAK) as u8)
        .collect()
}

/// Coefficient sparsity after thresholding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparsityReport {
    pub total: usize,
    pub nonzero: usize,
    pub zeroed: usize,
    pub epsilon: f64,
}

impl SparsityReport {
    pub fn from_coefficients(coefficients: &[f64], zeroed: usize, epsilon: f64) -> Self {
        Self {
            total: coefficients.len(),
            nonzero: nonzero_count(coefficients),
            zeroed,
            epsilon,
        }
    }

    pub fn compression_ratio(&self) -> f64 {
        compression_ratio(self.total, self.nonzero)
    }
}

impl fmt::Display for SparsityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nonzero {}/{} (ratio {:.2}:1, eps={})",
            self.nonzero,
            self.total,
            self.compression_ratio(),
            self.epsilon
        )
    }
}

/// Reference-versus-reconstruction fidelity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityReport {
    pub mse: f64,
    pub psnr: f64,
    pub sparsity: Option<SparsityReport>,
}

impl QualityReport {
    pub fn compare(reference: &[f64], test: &[f64]) -> Result<Self, HaarError> {
        let mse = mean_squared_error(reference, test)?;
        Ok(Self {
            mse,
            psnr: psnr(mse),
            sparsity: None,
        })
    }

    pub fn with_sparsity(mut self, sparsity: SparsityReport) -> Self {
        self.sparsity = Some(sparsity);
        self
    }

    pub fn is_lossless(&self) -> bool {
        self.psnr == f64::INFINITY
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MSE={:.2}, ", self.mse)?;
        if self.is_lossless() {
            write!(f, "PSNR=∞")?;
        } else {
            write!(f, "PSNR={:.2} dB", self.psnr)?;
        }
        if let Some(s) = &self.sparsity {
            write!(f, ", {s}")?;
        }
        Ok(())
    }
}
