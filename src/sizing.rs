//! Processing-size resolution for the ingestion boundary.

use core::fmt;
use core::str::FromStr;

use crate::error::HaarError;

/// Smallest size `Auto` resolves to.
pub const MIN_AUTO_SIZE: usize = 8;
/// Largest size `Auto` resolves to.
pub const MAX_AUTO_SIZE: usize = 1024;

/// Target width the source image is resized to before decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProcessingSize {
    /// Largest power of two not exceeding the shorter side, clamped to `[8, 1024]`.
    #[default]
    Auto,
    /// A caller-chosen power of two.
    Fixed(usize),
}

impl ProcessingSize {
    pub fn resolve(self, source_width: usize, source_height: usize) -> Result<usize, HaarError> {
        match self {
            ProcessingSize::Auto => Ok(auto_size(source_width, source_height)),
            ProcessingSize::Fixed(size) => {
                if size < 2 || !size.is_power_of_two() {
                    return Err(HaarError::InvalidProcessingSize { size });
                }
                Ok(size)
            }
        }
    }
}

impl FromStr for ProcessingSize {
    type Err = HaarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(ProcessingSize::Auto);
        }
        let size = s
            .parse::<usize>()
            .map_err(|_| HaarError::InvalidProcessingSize { size: 0 })?;
        ProcessingSize::Fixed(size).resolve(size, size)?;
        Ok(ProcessingSize::Fixed(size))
    }
}

impl fmt::Display for ProcessingSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingSize::Auto => write!(f, "auto"),
            ProcessingSize::Fixed(size) => write!(f, "{size}"),
        }
    }
}

/// Largest power of two `p ≤ min(sw, sh)`, clamped to `[MIN_AUTO_SIZE, MAX_AUTO_SIZE]`.
pub fn auto_size(source_width: usize, source_height: usize) -> usize {
    let n = source_width.min(source_height);
    let mut p = 1usize;
    while p < MAX_AUTO_SIZE && p << 1 <= n {
        p <<= 1;
    }
    p.max(MIN_AUTO_SIZE)
}

/// Resized dimensions: width becomes `size`, height keeps the aspect ratio (at least 1).
pub fn target_dimensions(source_width: usize, source_height: usize, size: usize) -> (usize, usize) {
    if source_width == 0 {
        return (size, size);
    }
    let height = libm::round(source_height as f64 * size as f64 / source_width as f64) as usize;
    (size, height.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_picks_largest_power_of_two() {
        assert_eq!(auto_size(300, 500), 256);
        assert_eq!(auto_size(512, 512), 512);
        assert_eq!(auto_size(3, 100), MIN_AUTO_SIZE);
        assert_eq!(auto_size(5000, 4000), MAX_AUTO_SIZE);
    }

    #[test]
    fn fixed_sizes_must_be_powers_of_two() {
        assert_eq!(ProcessingSize::Fixed(256).resolve(10, 10), Ok(256));
        assert_eq!(
            ProcessingSize::Fixed(300).resolve(10, 10),
            Err(HaarError::InvalidProcessingSize { size: 300 })
        );
        assert_eq!("AUTO".parse::<ProcessingSize>(), Ok(ProcessingSize::Auto));
        assert_eq!("128".parse::<ProcessingSize>(), Ok(ProcessingSize::Fixed(128)));
        assert!("12x".parse::<ProcessingSize>().is_err());
        assert!("96".parse::<ProcessingSize>().is_err());
    }

    #[test]
    fn aspect_preserving_targets() {
        assert_eq!(target_dimensions(300, 500, 256), (256, 427));
        assert_eq!(target_dimensions(1000, 1, 8), (8, 1));
    }
}
