//! Error type shared by every transform, metric and pipeline operation.

use core::fmt;

/// Errors that can occur while decomposing, sparsifying, reconstructing or
/// measuring a sample grid.
///
/// Every variant is raised at the call boundary before any caller-owned
/// buffer is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaarError {
    /// A 1D butterfly was asked to process an odd length or fewer than two samples.
    InvalidDimension { len: usize },
    /// Two buffers (or a buffer and its declared shape) disagree in element count.
    ShapeMismatch { expected: usize, actual: usize },
    /// The level count is zero or would shrink an active region below two samples.
    InvalidLevel { requested: usize, max: usize },
    /// The grid is not divisible by `2^levels` and the edge policy rejects it.
    IndivisibleGrid {
        width: usize,
        height: usize,
        levels: usize,
    },
    /// A coefficient buffer was paired with a descriptor or level plan that did not produce it.
    StaleDescriptor,
    /// An epsilon sweep was given coefficients that had already been thresholded.
    NotPristine,
    /// The input had no samples.
    EmptyInput,
    /// The threshold epsilon was negative or not finite.
    InvalidThreshold,
    /// A fixed processing size was not a power of two of at least two.
    InvalidProcessingSize { size: usize },
    /// A cooperative cancellation request was observed between levels.
    Cancelled { completed_levels: usize },
}

impl fmt::Display for HaarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaarError::InvalidDimension { len } => {
                write!(f, "butterfly length must be even and at least 2, got {len}")
            }
            HaarError::ShapeMismatch { expected, actual } => {
                write!(f, "shape mismatch: expected {expected} samples, got {actual}")
            }
            HaarError::InvalidLevel { requested, max } => {
                write!(f, "invalid level count {requested}: must be between 1 and {max}")
            }
            HaarError::IndivisibleGrid {
                width,
                height,
                levels,
            } => write!(
                f,
                "{width}x{height} grid is not divisible by 2^{levels}"
            ),
            HaarError::StaleDescriptor => {
                write!(f, "coefficients were not produced by this descriptor")
            }
            HaarError::NotPristine => {
                write!(f, "sweep needs unthresholded coefficients")
            }
            HaarError::EmptyInput => write!(f, "input buffer is empty"),
            HaarError::InvalidThreshold => {
                write!(f, "threshold epsilon must be finite and non-negative")
            }
            HaarError::InvalidProcessingSize { size } => {
                write!(f, "processing size {size} is not a power of two")
            }
            HaarError::Cancelled { completed_levels } => {
                write!(f, "transform cancelled after {completed_levels} level(s)")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HaarError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_names_the_offending_values() {
        let msg = HaarError::InvalidDimension { len: 5 }.to_string();
        assert!(msg.contains('5'));
        let msg = HaarError::InvalidLevel {
            requested: 9,
            max: 4,
        }
        .to_string();
        assert!(msg.contains('9') && msg.contains('4'));
        let msg = HaarError::IndivisibleGrid {
            width: 12,
            height: 8,
            levels: 3,
        }
        .to_string();
        assert_eq!(msg, "12x8 grid is not divisible by 2^3");
        assert!(HaarError::NotPristine.to_string().contains("unthresholded"));
    }
}
