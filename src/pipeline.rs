//! Transform → sparsify → reconstruct → measure, with all state passed explicitly.
//!
//! A [`Session`] holds only the edge policy. Every call takes the context
//! and descriptor parameters it needs, so changing levels, epsilon or
//! normalization can never silently reuse coefficients computed for other
//! settings: [`Session::run_inverse`] rejects them with
//! [`HaarError::StaleDescriptor`].

extern crate alloc;
use alloc::vec::Vec;

use log::debug;

use crate::butterfly::Normalization;
use crate::cancel::{Cancel, NeverCancel};
use crate::config::PipelineConfig;
use crate::error::HaarError;
use crate::image::IntensityBuffer;
use crate::metrics::{QualityReport, SparsityReport};
use crate::pyramid::{Coefficients, Descriptor, EdgePolicy, LevelSize};

/// A prepared source image.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    source: IntensityBuffer,
}

impl Context {
    pub fn source(&self) -> &IntensityBuffer {
        &self.source
    }
}

/// Result of [`Session::run_forward`].
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardOutput {
    pub coefficients: Coefficients,
    pub level_sizes: Vec<LevelSize>,
    pub report: SparsityReport,
}

/// Result of [`Session::recompute`].
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub coefficients: Coefficients,
    pub reconstruction: IntensityBuffer,
    pub report: QualityReport,
}

/// One point of an epsilon sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    pub epsilon: f64,
    pub report: QualityReport,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    edge_policy: EdgePolicy,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_edge_policy(edge_policy: EdgePolicy) -> Self {
        Self { edge_policy }
    }

    pub fn edge_policy(&self) -> EdgePolicy {
        self.edge_policy
    }

    /// Wrap a source buffer for the calls below.
    pub fn prepare(&self, source: IntensityBuffer) -> Context {
        debug!("prepared {}x{} source", source.width(), source.height());
        Context { source }
    }

    /// Descriptor this session would use for `context` with the given settings.
    pub fn descriptor(
        &self,
        context: &Context,
        levels: usize,
        orthonormal: bool,
    ) -> Result<Descriptor, HaarError> {
        Descriptor::new(
            &context.source,
            levels,
            Normalization::from_orthonormal(orthonormal),
            self.edge_policy,
        )
    }

    /// Decompose the context's source and hard-threshold the result at `epsilon`.
    ///
    /// Returns the bound coefficients, the level plan and a sparsity report.
    pub fn run_forward(
        &self,
        context: &Context,
        levels: usize,
        epsilon: f64,
        orthonormal: bool,
    ) -> Result<ForwardOutput, HaarError> {
        self.run_forward_cancellable(context, levels, epsilon, orthonormal, &NeverCancel)
    }

    /// [`Session::run_forward`] with a cancellation check before every level.
    pub fn run_forward_cancellable(
        &self,
        context: &Context,
        levels: usize,
        epsilon: f64,
        orthonormal: bool,
        cancel: &dyn Cancel,
    ) -> Result<ForwardOutput, HaarError> {
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(HaarError::InvalidThreshold);
        }
        let descriptor = self.descriptor(context, levels, orthonormal)?;
        let mut coefficients = descriptor.decompose_cancellable(&context.source, cancel)?;
        let zeroed = coefficients.threshold(epsilon);
        let report = SparsityReport::from_coefficients(coefficients.data(), zeroed, epsilon);
        debug!("forward L={levels} orthonormal={orthonormal}: {report}");
        Ok(ForwardOutput {
            level_sizes: coefficients.level_sizes().to_vec(),
            coefficients,
            report,
        })
    }

    /// Reconstruct `coefficients`, which must have been produced from `context`
    /// with the same `levels`, normalization and level plan.
    pub fn run_inverse(
        &self,
        context: &Context,
        coefficients: &Coefficients,
        level_sizes: &[LevelSize],
        levels: usize,
        orthonormal: bool,
    ) -> Result<IntensityBuffer, HaarError> {
        let descriptor = self
            .descriptor(context, levels, orthonormal)
            .map_err(|_| HaarError::StaleDescriptor)?;
        coefficients.reconstruct_with(&descriptor, level_sizes)
    }

    /// MSE and PSNR of `reconstruction` against `reference`; shapes must match.
    pub fn compare(
        &self,
        reference: &IntensityBuffer,
        reconstruction: &IntensityBuffer,
    ) -> Result<QualityReport, HaarError> {
        if (reference.width(), reference.height())
            != (reconstruction.width(), reconstruction.height())
        {
            return Err(HaarError::ShapeMismatch {
                expected: reference.len(),
                actual: reconstruction.len(),
            });
        }
        QualityReport::compare(reference.data(), reconstruction.data())
    }

    /// Full forward, threshold, inverse and compare for `config`.
    ///
    /// `config.edge_policy` is used for this call in place of the session's
    /// own policy, so a config fully determines the outcome.
    pub fn recompute(
        &self,
        context: &Context,
        config: &PipelineConfig,
    ) -> Result<Outcome, HaarError> {
        config.validate()?;
        let session = Session::with_edge_policy(config.edge_policy);
        let forward = session.run_forward(
            context,
            config.levels,
            config.threshold_epsilon,
            config.orthonormal,
        )?;
        let reconstruction = session.run_inverse(
            context,
            &forward.coefficients,
            &forward.level_sizes,
            config.levels,
            config.orthonormal,
        )?;
        let report = session
            .compare(&context.source, &reconstruction)?
            .with_sparsity(forward.report);
        Ok(Outcome {
            coefficients: forward.coefficients,
            reconstruction,
            report,
        })
    }

    /// Quality and sparsity for each epsilon, thresholding copies of `pristine`.
    ///
    /// `pristine` must come from an epsilon-0 forward pass of `context`;
    /// already thresholded coefficients fail with [`HaarError::NotPristine`].
    pub fn sweep(
        &self,
        context: &Context,
        pristine: &Coefficients,
        epsilons: &[f64],
    ) -> Result<Vec<SweepPoint>, HaarError> {
        if pristine.descriptor().source() != context.source.fingerprint() {
            return Err(HaarError::StaleDescriptor);
        }
        if pristine.epsilon() > 0.0 {
            return Err(HaarError::NotPristine);
        }
        epsilons
            .iter()
            .map(|&epsilon| {
                if !epsilon.is_finite() || epsilon < 0.0 {
                    return Err(HaarError::InvalidThreshold);
                }
                let (coefficients, zeroed) = pristine.thresholded(epsilon);
                let reconstruction = coefficients.reconstruct()?;
                let sparsity =
                    SparsityReport::from_coefficients(coefficients.data(), zeroed, epsilon);
                let report = self
                    .compare(&context.source, &reconstruction)?
                    .with_sparsity(sparsity);
                Ok(SweepPoint { epsilon, report })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(w: usize, h: usize) -> IntensityBuffer {
        let data = (0..w * h).map(|i| ((i * 7) % 256) as f64).collect();
        IntensityBuffer::from_vec(w, h, data).unwrap()
    }

    #[test]
    fn lossless_roundtrip_through_session() {
        let session = Session::new();
        let ctx = session.prepare(ramp(16, 16));
        let fwd = session.run_forward(&ctx, 3, 0.0, true).unwrap();
        let recon = session
            .run_inverse(&ctx, &fwd.coefficients, &fwd.level_sizes, 3, true)
            .unwrap();
        let report = session.compare(ctx.source(), &recon).unwrap();
        assert!(report.mse < 1e-12);
        assert_eq!(fwd.report.total, 256);
    }

    #[test]
    fn changed_settings_are_stale() {
        let session = Session::new();
        let ctx = session.prepare(ramp(8, 8));
        let fwd = session.run_forward(&ctx, 2, 0.0, true).unwrap();
        let err = session.run_inverse(&ctx, &fwd.coefficients, &fwd.level_sizes, 1, true);
        assert_eq!(err, Err(HaarError::StaleDescriptor));
        let err = session.run_inverse(&ctx, &fwd.coefficients, &fwd.level_sizes, 2, false);
        assert_eq!(err, Err(HaarError::StaleDescriptor));
        let shifted = ramp(8, 8).into_vec().iter().map(|v| v + 1.0).collect();
        let other = session.prepare(IntensityBuffer::from_vec(8, 8, shifted).unwrap());
        let err = session.run_inverse(&other, &fwd.coefficients, &fwd.level_sizes, 2, true);
        assert_eq!(err, Err(HaarError::StaleDescriptor));
    }

    #[test]
    fn recompute_uses_config_edge_policy() {
        let session = Session::with_edge_policy(EdgePolicy::Pad);
        let ctx = session.prepare(ramp(12, 8));
        let config = PipelineConfig {
            levels: 3,
            edge_policy: EdgePolicy::Reject,
            ..Default::default()
        };
        assert!(matches!(
            session.recompute(&ctx, &config),
            Err(HaarError::IndivisibleGrid { .. })
        ));
        let padded = PipelineConfig {
            edge_policy: EdgePolicy::Pad,
            ..config
        };
        let outcome = Session::with_edge_policy(EdgePolicy::Reject)
            .recompute(&ctx, &padded)
            .unwrap();
        assert_eq!(outcome.coefficients.width(), 16);
    }

    #[test]
    fn sweep_is_monotone_in_sparsity() {
        let session = Session::new();
        let ctx = session.prepare(ramp(16, 8));
        let fwd = session.run_forward(&ctx, 2, 0.0, true).unwrap();
        let points = session
            .sweep(&ctx, &fwd.coefficients, &[0.0, 10.0, 20.0, 40.0, 60.0])
            .unwrap();
        let nonzero: Vec<usize> = points
            .iter()
            .map(|p| p.report.sparsity.map(|s| s.nonzero).unwrap_or(0))
            .collect();
        assert!(nonzero.windows(2).all(|w| w[0] >= w[1]));
        assert!(points[0].report.mse < 1e-12);
        assert!(points[4].report.mse > 0.0);
        assert_eq!(fwd.coefficients.epsilon(), 0.0);
    }
}
