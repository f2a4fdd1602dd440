//! Multi-level separable 2D Haar decomposition (row-column algorithm).
//!
//! - Each level runs a row pass then a column pass over the top-left active
//!   region; the approximation quadrant becomes the next level's region.
//! - The inverse replays levels coarsest-first, column pass before row pass.
//! - Raw slice API ([`forward`], [`inverse`]) and a descriptor-bound API
//!   ([`Descriptor`], [`Coefficients`]) that refuses mismatched pairings.

extern crate alloc;
use alloc::vec;
use alloc::vec::Vec;
use core::str::FromStr;

use log::{debug, trace};

use crate::butterfly::{self, Normalization};
use crate::cancel::{Cancel, NeverCancel};
use crate::error::HaarError;
use crate::image::{Fingerprint, IntensityBuffer};
use crate::threshold;

#[cfg(feature = "parallel")]
use core::sync::atomic::{AtomicUsize, Ordering};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "parallel")]
use std::sync::OnceLock;

/// Default minimum active-region size (in samples) before a pass is split across threads.
#[cfg(feature = "parallel")]
const DEFAULT_PARALLEL_MIN_SAMPLES: usize = 1 << 16;

/// `0` means no override.
#[cfg(feature = "parallel")]
static PARALLEL_THRESHOLD_OVERRIDE: AtomicUsize = AtomicUsize::new(0);
#[cfg(feature = "parallel")]
static PARALLEL_THRESHOLD_ENV: OnceLock<usize> = OnceLock::new();

#[cfg(feature = "parallel")]
/// Set the minimum active-region size that uses parallel row/column passes.
///
/// Passing `0` reverts to `HAARLET_PAR_MIN_SAMPLES` or the built-in default.
pub fn set_parallel_threshold(samples: usize) {
    PARALLEL_THRESHOLD_OVERRIDE.store(samples, Ordering::Relaxed);
}

#[cfg(feature = "parallel")]
fn parallel_threshold() -> usize {
    let overridden = PARALLEL_THRESHOLD_OVERRIDE.load(Ordering::Relaxed);
    if overridden != 0 {
        return overridden;
    }
    *PARALLEL_THRESHOLD_ENV.get_or_init(|| {
        std::env::var("HAARLET_PAR_MIN_SAMPLES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&v| v != 0)
            .unwrap_or(DEFAULT_PARALLEL_MIN_SAMPLES)
    })
}

/// Active region `(curW, curH)` of one level, before the even crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LevelSize {
    pub width: usize,
    pub height: usize,
}

impl LevelSize {
    /// Extent actually run through the butterflies: a trailing odd row/column is left alone.
    #[inline]
    pub fn transformed(self) -> (usize, usize) {
        (self.width & !1, self.height & !1)
    }
}

/// How grids whose sides are not multiples of `2^levels` are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EdgePolicy {
    /// Fail with [`HaarError::IndivisibleGrid`].
    Reject,
    /// Floor each level's region; trailing rows/columns stay untransformed.
    Truncate,
    /// Edge-replicate up to the next multiple of `2^levels`, crop on reconstruction.
    #[default]
    Pad,
}

impl FromStr for EdgePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            v if v.eq_ignore_ascii_case("reject") => Ok(EdgePolicy::Reject),
            v if v.eq_ignore_ascii_case("truncate") => Ok(EdgePolicy::Truncate),
            v if v.eq_ignore_ascii_case("pad") => Ok(EdgePolicy::Pad),
            _ => Err(()),
        }
    }
}

/// Largest level count a `width × height` grid supports.
pub fn max_levels(width: usize, height: usize) -> usize {
    let min = width.min(height);
    if min < 2 {
        return 0;
    }
    (usize::BITS - 1 - min.leading_zeros()) as usize
}

fn check_levels(width: usize, height: usize, levels: usize) -> Result<(), HaarError> {
    let max = max_levels(width, height);
    if levels == 0 || levels > max {
        return Err(HaarError::InvalidLevel {
            requested: levels,
            max,
        });
    }
    Ok(())
}

/// Per-level active regions for an `L`-level decomposition, finest first.
pub fn level_sizes(width: usize, height: usize, levels: usize) -> Vec<LevelSize> {
    let mut sizes = Vec::with_capacity(levels);
    let (mut w, mut h) = (width, height);
    for _ in 0..levels {
        sizes.push(LevelSize {
            width: w,
            height: h,
        });
        w /= 2;
        h /= 2;
    }
    sizes
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Inverse,
}

#[inline]
fn run_butterfly(
    seq: &mut [f64],
    scratch: &mut [f64],
    norm: Normalization,
    dir: Direction,
) -> Result<(), HaarError> {
    match dir {
        Direction::Forward => butterfly::forward_with_scratch(seq, scratch, norm),
        Direction::Inverse => butterfly::inverse_with_scratch(seq, scratch, norm),
    }
}

fn row_pass(
    grid: &mut [f64],
    stride: usize,
    size: LevelSize,
    norm: Normalization,
    dir: Direction,
) -> Result<(), HaarError> {
    let (w, h) = size.transformed();
    #[cfg(feature = "parallel")]
    if w * h >= parallel_threshold() {
        return grid
            .par_chunks_mut(stride)
            .take(h)
            .try_for_each_init(
                || vec![0.0; w],
                |scratch, row| run_butterfly(&mut row[..w], scratch, norm, dir),
            );
    }
    let mut scratch = vec![0.0; w];
    for row in grid.chunks_mut(stride).take(h) {
        run_butterfly(&mut row[..w], &mut scratch, norm, dir)?;
    }
    Ok(())
}

fn column_pass(
    grid: &mut [f64],
    stride: usize,
    size: LevelSize,
    norm: Normalization,
    dir: Direction,
) -> Result<(), HaarError> {
    let (w, h) = size.transformed();
    #[cfg(feature = "parallel")]
    if w * h >= parallel_threshold() {
        let mut columns = vec![0.0; w * h];
        {
            let src: &[f64] = grid;
            columns
                .par_chunks_mut(h)
                .enumerate()
                .try_for_each_init(
                    || vec![0.0; h],
                    |scratch, (x, col)| {
                        for (y, c) in col.iter_mut().enumerate() {
                            *c = src[y * stride + x];
                        }
                        run_butterfly(col, scratch, norm, dir)
                    },
                )?;
        }
        for (x, col) in columns.chunks_exact(h).enumerate() {
            for (y, &c) in col.iter().enumerate() {
                grid[y * stride + x] = c;
            }
        }
        return Ok(());
    }
    let mut col = vec![0.0; h];
    let mut scratch = vec![0.0; h];
    for x in 0..w {
        for (y, c) in col.iter_mut().enumerate() {
            *c = grid[y * stride + x];
        }
        run_butterfly(&mut col, &mut scratch, norm, dir)?;
        for (y, &c) in col.iter().enumerate() {
            grid[y * stride + x] = c;
        }
    }
    Ok(())
}

fn forward_levels(
    grid: &mut [f64],
    stride: usize,
    sizes: &[LevelSize],
    norm: Normalization,
    cancel: &dyn Cancel,
) -> Result<(), HaarError> {
    for (level, &size) in sizes.iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(HaarError::Cancelled {
                completed_levels: level,
            });
        }
        trace!("forward level {level}: {}x{}", size.width, size.height);
        row_pass(grid, stride, size, norm, Direction::Forward)?;
        column_pass(grid, stride, size, norm, Direction::Forward)?;
    }
    Ok(())
}

fn inverse_levels(
    grid: &mut [f64],
    stride: usize,
    sizes: &[LevelSize],
    norm: Normalization,
    cancel: &dyn Cancel,
) -> Result<(), HaarError> {
    for (done, (level, &size)) in sizes.iter().enumerate().rev().enumerate() {
        if cancel.is_cancelled() {
            return Err(HaarError::Cancelled {
                completed_levels: done,
            });
        }
        trace!("inverse level {level}: {}x{}", size.width, size.height);
        column_pass(grid, stride, size, norm, Direction::Inverse)?;
        row_pass(grid, stride, size, norm, Direction::Inverse)?;
    }
    Ok(())
}

fn check_shape(width: usize, height: usize, len: usize) -> Result<(), HaarError> {
    if width == 0 || height == 0 {
        return Err(HaarError::EmptyInput);
    }
    let expected = width.checked_mul(height).ok_or(HaarError::ShapeMismatch {
        expected: usize::MAX,
        actual: len,
    })?;
    if len != expected {
        return Err(HaarError::ShapeMismatch {
            expected,
            actual: len,
        });
    }
    Ok(())
}

/// Forward `levels`-level decomposition of a row-major `width × height` grid.
///
/// Returns the coefficient grid (same shape as the input) and the active
/// region used at each level, finest first. Dimensions that are not
/// multiples of `2^levels` are floored per level; the samples outside each
/// floored region pass through unchanged.
pub fn forward(
    data: &[f64],
    width: usize,
    height: usize,
    levels: usize,
    normalization: Normalization,
) -> Result<(Vec<f64>, Vec<LevelSize>), HaarError> {
    check_shape(width, height, data.len())?;
    check_levels(width, height, levels)?;
    let sizes = level_sizes(width, height, levels);
    let mut grid = data.to_vec();
    forward_levels(&mut grid, width, &sizes, normalization, &NeverCancel)?;
    Ok((grid, sizes))
}

/// Inverse of [`forward`]; `sizes` must be the plan `forward` returned.
pub fn inverse(
    coefficients: &[f64],
    width: usize,
    height: usize,
    levels: usize,
    normalization: Normalization,
    sizes: &[LevelSize],
) -> Result<Vec<f64>, HaarError> {
    check_shape(width, height, coefficients.len())?;
    check_levels(width, height, levels)?;
    if sizes != level_sizes(width, height, levels).as_slice() {
        return Err(HaarError::StaleDescriptor);
    }
    let mut grid = coefficients.to_vec();
    inverse_levels(&mut grid, width, sizes, normalization, &NeverCancel)?;
    Ok(grid)
}

/// Immutable description of one decomposition: everything needed to invert it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Descriptor {
    levels: usize,
    normalization: Normalization,
    width: usize,
    height: usize,
    edge_policy: EdgePolicy,
    source: Fingerprint,
}

impl Descriptor {
    /// Describe an `levels`-level decomposition of `source`.
    pub fn new(
        source: &IntensityBuffer,
        levels: usize,
        normalization: Normalization,
        edge_policy: EdgePolicy,
    ) -> Result<Self, HaarError> {
        let (width, height) = (source.width(), source.height());
        check_levels(width, height, levels)?;
        if edge_policy == EdgePolicy::Reject {
            let block = 1usize << levels;
            if width % block != 0 || height % block != 0 {
                return Err(HaarError::IndivisibleGrid {
                    width,
                    height,
                    levels,
                });
            }
        }
        Ok(Self {
            levels,
            normalization,
            width,
            height,
            edge_policy,
            source: source.fingerprint(),
        })
    }

    /// Number of decomposition levels.
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Butterfly normalization used on every level.
    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    /// Width of the source buffer.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the source buffer.
    pub fn height(&self) -> usize {
        self.height
    }

    /// How the source was fitted to the `2^levels` block size.
    pub fn edge_policy(&self) -> EdgePolicy {
        self.edge_policy
    }

    /// Fingerprint of the buffer this descriptor was built for.
    pub fn source(&self) -> Fingerprint {
        self.source
    }

    /// Shape of the coefficient grid; larger than the source only under [`EdgePolicy::Pad`].
    pub fn grid_dimensions(&self) -> (usize, usize) {
        match self.edge_policy {
            EdgePolicy::Pad => {
                let block = 1usize << self.levels;
                (
                    self.width.div_ceil(block) * block,
                    self.height.div_ceil(block) * block,
                )
            }
            EdgePolicy::Reject | EdgePolicy::Truncate => (self.width, self.height),
        }
    }

    pub fn level_sizes(&self) -> Vec<LevelSize> {
        let (w, h) = self.grid_dimensions();
        level_sizes(w, h, self.levels)
    }

    /// Decompose `source`, which must be the buffer this descriptor was built for.
    pub fn decompose(&self, source: &IntensityBuffer) -> Result<Coefficients, HaarError> {
        self.decompose_cancellable(source, &NeverCancel)
    }

    /// [`Descriptor::decompose`] with a cancellation check before every level.
    pub fn decompose_cancellable(
        &self,
        source: &IntensityBuffer,
        cancel: &dyn Cancel,
    ) -> Result<Coefficients, HaarError> {
        if source.fingerprint() != self.source {
            return Err(HaarError::StaleDescriptor);
        }
        let (gw, gh) = self.grid_dimensions();
        debug!(
            "decomposing {}x{} (grid {}x{}) levels={} norm={:?} edge={:?}",
            self.width, self.height, gw, gh, self.levels, self.normalization, self.edge_policy
        );
        let mut grid = if (gw, gh) == (self.width, self.height) {
            source.data().to_vec()
        } else {
            pad_replicate(source, gw, gh)
        };
        let sizes = self.level_sizes();
        forward_levels(&mut grid, gw, &sizes, self.normalization, cancel)?;
        Ok(Coefficients {
            data: grid,
            descriptor: *self,
            sizes,
            epsilon: 0.0,
        })
    }
}

fn pad_replicate(source: &IntensityBuffer, gw: usize, gh: usize) -> Vec<f64> {
    let (w, h) = (source.width(), source.height());
    let mut grid = Vec::with_capacity(gw * gh);
    for y in 0..gh {
        let row = source.row(y.min(h - 1));
        grid.extend_from_slice(row);
        let last = row[w - 1];
        grid.extend(core::iter::repeat(last).take(gw - w));
    }
    grid
}

/// A coefficient grid bound to the descriptor and level plan that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficients {
    data: Vec<f64>,
    descriptor: Descriptor,
    sizes: Vec<LevelSize>,
    epsilon: f64,
}

impl Coefficients {
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn level_sizes(&self) -> &[LevelSize] {
        &self.sizes
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Grid width (the row stride).
    pub fn width(&self) -> usize {
        self.descriptor.grid_dimensions().0
    }

    /// Grid height.
    pub fn height(&self) -> usize {
        self.descriptor.grid_dimensions().1
    }

    /// Largest epsilon applied so far; `0` for pristine coefficients.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Hard-threshold in place, returning how many coefficients were zeroed.
    pub fn threshold(&mut self, epsilon: f64) -> usize {
        let zeroed = threshold::threshold_in_place(&mut self.data, epsilon);
        if epsilon > self.epsilon {
            self.epsilon = epsilon;
        }
        zeroed
    }

    /// Thresholded copy; `self` stays pristine.
    pub fn thresholded(&self, epsilon: f64) -> (Coefficients, usize) {
        let mut copy = self.clone();
        let zeroed = copy.threshold(epsilon);
        (copy, zeroed)
    }

    /// Reconstruct using `descriptor`, which must be the one that produced these coefficients.
    pub fn reconstruct_with(
        &self,
        descriptor: &Descriptor,
        sizes: &[LevelSize],
    ) -> Result<IntensityBuffer, HaarError> {
        self.reconstruct_cancellable(descriptor, sizes, &NeverCancel)
    }

    /// Reconstruct with the bound descriptor.
    pub fn reconstruct(&self) -> Result<IntensityBuffer, HaarError> {
        self.reconstruct_cancellable(&self.descriptor, &self.sizes, &NeverCancel)
    }

    pub fn reconstruct_cancellable(
        &self,
        descriptor: &Descriptor,
        sizes: &[LevelSize],
        cancel: &dyn Cancel,
    ) -> Result<IntensityBuffer, HaarError> {
        if *descriptor != self.descriptor || sizes != self.sizes.as_slice() {
            return Err(HaarError::StaleDescriptor);
        }
        let (gw, _) = descriptor.grid_dimensions();
        debug!(
            "reconstructing {}x{} levels={} epsilon={}",
            descriptor.width, descriptor.height, descriptor.levels, self.epsilon
        );
        let mut grid = self.data.clone();
        inverse_levels(&mut grid, gw, sizes, descriptor.normalization, cancel)?;
        let (w, h) = (descriptor.width, descriptor.height);
        if gw != w || grid.len() != w * h {
            grid = grid
                .chunks_exact(gw)
                .take(h)
                .flat_map(|row| row[..w].iter().copied())
                .collect();
        }
        IntensityBuffer::from_vec(w, h, grid)
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}
