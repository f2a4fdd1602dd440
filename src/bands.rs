//! Typed view of the nested quadrant layout of a coefficient grid.
//!
//! At level `k` the active region `(curW, curH)` (cropped to even) splits into
//! four quadrants of `curW/2 × curH/2`:
//!
//! ```text
//! +----------------+----------------+
//! | approximation  | horizontal     |
//! +----------------+----------------+
//! | vertical       | diagonal       |
//! +----------------+----------------+
//! ```
//!
//! The approximation quadrant is the active region of level `k + 1`.

use crate::error::HaarError;
use crate::pyramid::{Coefficients, LevelSize};

/// One of the four sub-bands produced by a decomposition level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subband {
    Approximation,
    Horizontal,
    Vertical,
    Diagonal,
}

impl Subband {
    pub const ALL: [Subband; 4] = [
        Subband::Approximation,
        Subband::Horizontal,
        Subband::Vertical,
        Subband::Diagonal,
    ];
}

/// Axis-aligned rectangle inside a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }
}

/// Region of `band` for a level whose active region is `size`.
pub fn band_region(size: LevelSize, band: Subband) -> Region {
    let (w, h) = size.transformed();
    let (hw, hh) = (w / 2, h / 2);
    let (x, y) = match band {
        Subband::Approximation => (0, 0),
        Subband::Horizontal => (hw, 0),
        Subband::Vertical => (0, hh),
        Subband::Diagonal => (hw, hh),
    };
    Region {
        x,
        y,
        width: hw,
        height: hh,
    }
}

/// Borrowed view of one sub-band.
#[derive(Debug, Clone, Copy)]
pub struct BandView<'a> {
    data: &'a [f64],
    stride: usize,
    region: Region,
}

impl<'a> BandView<'a> {
    pub fn region(&self) -> Region {
        self.region
    }

    pub fn width(&self) -> usize {
        self.region.width
    }

    pub fn height(&self) -> usize {
        self.region.height
    }

    /// Sample at band-local `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.region.width || y >= self.region.height {
            return None;
        }
        self.data
            .get((self.region.y + y) * self.stride + self.region.x + x)
            .copied()
    }

    /// Band-local row `y`, or `None` past the last row.
    pub fn row(&self, y: usize) -> Option<&'a [f64]> {
        if y >= self.region.height {
            return None;
        }
        let start = (self.region.y + y) * self.stride + self.region.x;
        self.data.get(start..start + self.region.width)
    }

    /// Row-major iterator over the band's samples.
    pub fn iter(&self) -> impl Iterator<Item = f64> + 'a {
        let (data, stride, region) = (self.data, self.stride, self.region);
        (0..region.height).flat_map(move |y| {
            let start = (region.y + y) * stride + region.x;
            data[start..start + region.width].iter().copied()
        })
    }

    /// Sum of squared samples.
    pub fn energy(&self) -> f64 {
        self.iter().map(|v| v * v).sum()
    }
}

impl Coefficients {
    /// Sub-band `band` of level `level` (0 = finest).
    pub fn band(&self, level: usize, band: Subband) -> Result<BandView<'_>, HaarError> {
        let sizes = self.level_sizes();
        let size = sizes.get(level).ok_or(HaarError::InvalidLevel {
            requested: level,
            max: sizes.len().saturating_sub(1),
        })?;
        Ok(BandView {
            data: self.data(),
            stride: self.width(),
            region: band_region(*size, band),
        })
    }

    /// Coarsest approximation band, `[0, w/2^L) × [0, h/2^L)`.
    pub fn coarsest(&self) -> BandView<'_> {
        let sizes = self.level_sizes();
        // A descriptor always plans at least one level.
        let region = match sizes.last() {
            Some(&size) => band_region(size, Subband::Approximation),
            None => Region {
                x: 0,
                y: 0,
                width: self.width(),
                height: self.height(),
            },
        };
        BandView {
            data: self.data(),
            stride: self.width(),
            region,
        }
    }
}
