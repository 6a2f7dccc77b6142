//! Depth validity rules.
//!
//! A measurement is valid when it is finite, strictly positive and, when a
//! sensing range is configured, no farther than `zmax`. A `zmax` of zero means
//! no range is configured.

use crate::depth_pipeline::common::error::{DepthError, Result};
use crate::depth_pipeline::depth::types::{DepthFrame, ValidityMask};

/// Checks a configured sensing range. Zero is accepted and means "unbounded".
pub fn validate_zmax(zmax: f32) -> Result<f32> {
    if !zmax.is_finite() {
        return Err(DepthError::InvalidValue(format!("zmax must be finite, got {zmax}")));
    }
    if zmax < 0.0 {
        return Err(DepthError::InvalidValue(format!("zmax must not be negative, got {zmax}")));
    }
    Ok(zmax)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidityPolicy {
    /// Maximum sensing range in metres; `<= 0` disables the range test
    pub zmax: f32,
    /// Whether sanitize rejects zero and negative depths
    pub treat_non_positive_as_invalid: bool,
    /// Sentinel written into invalid pixels by sanitize
    pub invalid_fill: f32,
}

impl Default for ValidityPolicy {
    fn default() -> Self {
        Self {
            zmax: 0.0,
            treat_non_positive_as_invalid: true,
            invalid_fill: 0.0,
        }
    }
}

impl ValidityPolicy {
    pub fn new(zmax: f32) -> Self {
        Self {
            zmax,
            ..Self::default()
        }
    }

    pub fn with_invalid_fill(mut self, fill: f32) -> Self {
        self.invalid_fill = fill;
        self
    }

    pub fn with_non_positive_invalid(mut self, enable: bool) -> Self {
        self.treat_non_positive_as_invalid = enable;
        self
    }

    fn in_range(&self, value: f32) -> bool {
        self.zmax <= 0.0 || value <= self.zmax
    }

    /// Validity test used when a frame enters the pipeline.
    pub fn is_valid(&self, value: f32) -> bool {
        value.is_finite() && value > 0.0 && self.in_range(value)
    }

    fn is_valid_after_noise(&self, value: f32) -> bool {
        value.is_finite()
            && (!self.treat_non_positive_as_invalid || value > 0.0)
            && self.in_range(value)
    }

    pub fn initial_mask(&self, frame: &DepthFrame) -> ValidityMask {
        ValidityMask::from_fn(frame, |v| self.is_valid(v))
    }

    /// Re-derives validity from the values alone and writes `invalid_fill`
    /// into every pixel that fails it.
    pub fn sanitize(&self, mut frame: DepthFrame) -> (DepthFrame, ValidityMask) {
        let mask = ValidityMask::from_fn(&frame, |v| self.is_valid_after_noise(v));
        for (value, &valid) in frame.data.iter_mut().zip(&mask.data) {
            if !valid {
                *value = self.invalid_fill;
            }
        }
        (frame, mask)
    }

    /// Zeroes non-finite, non-positive and out-of-range ground truth.
    pub fn clamp_to_zmax(&self, frame: DepthFrame) -> DepthFrame {
        let policy = ValidityPolicy {
            invalid_fill: 0.0,
            ..*self
        };
        policy.sanitize(frame).0
    }
}
