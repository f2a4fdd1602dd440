//! Intensity buffers: immutable row-major grids of grayscale samples.

extern crate alloc;
use alloc::vec::Vec;
use core::fmt;

use crate::error::HaarError;

/// BLAKE3 digest identifying the exact samples and shape of an intensity buffer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    fn of(width: usize, height: usize, data: &[f64]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(width as u64).to_le_bytes());
        hasher.update(&(height as u64).to_le_bytes());
        for v in data {
            hasher.update(&v.to_bits().to_le_bytes());
        }
        Fingerprint(*hasher.finalize().as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint(")?;
        for b in &self.0[..8] {
            write!(f, "{b:02x}")?;
        }
        write!(f, "..)")
    }
}

/// Row-major grid of intensity samples, conceptually in `[0, 255]`.
///
/// The buffer is immutable once built; its [`Fingerprint`] is computed at
/// construction and binds any coefficients derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityBuffer {
    width: usize,
    height: usize,
    data: Vec<f64>,
    fingerprint: Fingerprint,
}

impl IntensityBuffer {
    pub fn from_vec(width: usize, height: usize, data: Vec<f64>) -> Result<Self, HaarError> {
        if width == 0 || height == 0 {
            return Err(HaarError::EmptyInput);
        }
        let expected = width.checked_mul(height).ok_or(HaarError::ShapeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;
        if data.len() != expected {
            return Err(HaarError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }
        let fingerprint = Fingerprint::of(width, height, &data);
        Ok(Self {
            width,
            height,
            data,
            fingerprint,
        })
    }

    /// Build from 8-bit luma samples.
    pub fn from_luma8(width: usize, height: usize, luma: &[u8]) -> Result<Self, HaarError> {
        Self::from_vec(width, height, luma.iter().map(|&v| f64::from(v)).collect())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn row(&self, y: usize) -> &[f64] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Round and clamp every sample to an 8-bit luma value for display or export.
    pub fn to_luma8(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&v| libm::round(v).clamp(0.0, 255.0) as u8)
            .collect()
    }
}
