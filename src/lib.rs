//! # haarlet - multi-level 2D Haar wavelet decomposition for Rust
//!
//! Decomposes a grayscale sample grid into a nested pyramid of Haar
//! sub-bands, sparsifies the coefficients by hard thresholding, reconstructs
//! an approximation and reports fidelity/compaction metrics.
//!
//! ## Features
//!
//! - **Exactly invertible butterfly** under orthonormal (`1/√2`) and
//!   averaging (`1/2`) normalization
//! - **Descriptor-bound coefficients**: reconstruction refuses coefficients
//!   paired with settings or a source that did not produce them
//! - **Typed sub-band views** over the nested quadrant layout
//! - **Edge policies** for grids not divisible by `2^levels`
//! - **Cooperative cancellation** between levels
//! - **Parallel row/column passes** (optional)
//!
//! ## Cargo Features
//!
//! - `std` (default): `std::error::Error` impls and environment configuration
//! - `parallel`: split row and column passes across threads with Rayon
//!
//! ## Example
//!
//! ```
//! use haarlet::{IntensityBuffer, PipelineConfig, Session};
//!
//! let data: Vec<f64> = (0..64).map(|i| (i * 4) as f64).collect();
//! let source = IntensityBuffer::from_vec(8, 8, data).unwrap();
//! let session = Session::new();
//! let ctx = session.prepare(source);
//! let config = PipelineConfig { levels: 2, threshold_epsilon: 10.0, ..Default::default() };
//! let outcome = session.recompute(&ctx, &config).unwrap();
//! println!("{}", outcome.report);
//! ```
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or https://www.apache.org/licenses/LICENSE-2.0)
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or https://opensource.org/licenses/MIT)
//!
//! at your option.

#![no_std]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

/// Error type for every fallible operation.
pub mod error;

/// 1D Haar butterfly
///
/// Pairwise sum/difference forward and inverse on an even-length sequence.
pub mod butterfly;

/// 2D pyramid transform
///
/// Row-column multi-level decomposition, descriptors and bound coefficients.
pub mod pyramid;

/// Sub-band views over a coefficient grid.
pub mod bands;

/// Hard thresholding.
pub mod threshold;

/// MSE, PSNR, sparsity and display normalization.
pub mod metrics;

/// Processing-size resolution and resize targets.
pub mod sizing;

/// Pipeline configuration with environment overrides.
pub mod config;

/// Intensity buffers and their fingerprints.
pub mod image;

/// Cooperative cancellation between levels.
pub mod cancel;

/// Explicit-state transform pipeline.
pub mod pipeline;

pub use bands::{BandView, Region, Subband};
pub use butterfly::Normalization;
pub use cancel::{Cancel, NeverCancel};
pub use config::PipelineConfig;
pub use error::HaarError;
pub use image::{Fingerprint, IntensityBuffer};
pub use metrics::{QualityReport, SparsityReport};
pub use pipeline::{Context, ForwardOutput, Outcome, Session, SweepPoint};
pub use pyramid::{Coefficients, Descriptor, EdgePolicy, LevelSize};
pub use sizing::ProcessingSize;
