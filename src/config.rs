//! Pipeline configuration surface.

use crate::butterfly::Normalization;
use crate::error::HaarError;
use crate::pyramid::EdgePolicy;
use crate::sizing::ProcessingSize;

/// Caller-supplied settings for one recompute.
///
/// Nothing here is cached by the pipeline: changing any field means running
/// the forward transform again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub levels: usize,
    pub threshold_epsilon: f64,
    pub orthonormal: bool,
    pub processing_size: ProcessingSize,
    pub edge_policy: EdgePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            levels: 1,
            threshold_epsilon: 0.0,
            orthonormal: true,
            processing_size: ProcessingSize::Auto,
            edge_policy: EdgePolicy::Pad,
        }
    }
}

impl PipelineConfig {
    /// Check field ranges that do not depend on the image.
    pub fn validate(&self) -> Result<(), HaarError> {
        if self.levels == 0 {
            return Err(HaarError::InvalidLevel {
                requested: 0,
                max: usize::BITS as usize - 1,
            });
        }
        if !self.threshold_epsilon.is_finite() || self.threshold_epsilon < 0.0 {
            return Err(HaarError::InvalidThreshold);
        }
        if let ProcessingSize::Fixed(size) = self.processing_size {
            if size < 2 || !size.is_power_of_two() {
                return Err(HaarError::InvalidProcessingSize { size });
            }
        }
        Ok(())
    }

    pub fn normalization(&self) -> Normalization {
        Normalization::from_orthonormal(self.orthonormal)
    }

    /// Defaults overridden by `HAARLET_LEVELS`, `HAARLET_EPSILON`,
    /// `HAARLET_ORTHONORMAL`, `HAARLET_SIZE` and `HAARLET_EDGE`.
    ///
    /// Unparseable values are ignored with a warning.
    #[cfg(feature = "std")]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`PipelineConfig::from_env`] with an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<alloc::string::String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = lookup("HAARLET_LEVELS") {
            match v.trim().parse() {
                Ok(levels) => cfg.levels = levels,
                Err(_) => log::warn!("ignoring HAARLET_LEVELS={v:?}"),
            }
        }
        if let Some(v) = lookup("HAARLET_EPSILON") {
            match v.trim().parse() {
                Ok(eps) => cfg.threshold_epsilon = eps,
                Err(_) => log::warn!("ignoring HAARLET_EPSILON={v:?}"),
            }
        }
        if let Some(v) = lookup("HAARLET_ORTHONORMAL") {
            match v.trim() {
                "1" | "true" | "yes" | "on" => cfg.orthonormal = true,
                "0" | "false" | "no" | "off" => cfg.orthonormal = false,
                _ => log::warn!("ignoring HAARLET_ORTHONORMAL={v:?}"),
            }
        }
        if let Some(v) = lookup("HAARLET_SIZE") {
            match v.parse() {
                Ok(size) => cfg.processing_size = size,
                Err(_) => log::warn!("ignoring HAARLET_SIZE={v:?}"),
            }
        }
        if let Some(v) = lookup("HAARLET_EDGE") {
            match v.parse() {
                Ok(policy) => cfg.edge_policy = policy,
                Err(_) => log::warn!("ignoring HAARLET_EDGE={v:?}"),
            }
        }
        cfg
    }
}
