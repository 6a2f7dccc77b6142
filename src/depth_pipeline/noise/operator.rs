//! Mask-aware depth noise operators.
//!
//! Every operator only touches pixels that are valid in the mask it is given
//! and returns a mask that is a subset of it. Dropout is the only operator that
//! narrows the mask.

use std::fmt;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Deserialize;

use crate::depth_pipeline::common::error::{DepthError, Result};
use crate::depth_pipeline::depth::types::{DepthFrame, ValidityMask};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    Gaussian,
    Multiplicative,
    Quantization,
    Dropout,
}

impl NoiseKind {
    /// Application order used when the configuration does not give one.
    pub const DEFAULT_ORDER: [NoiseKind; 4] = [
        NoiseKind::Gaussian,
        NoiseKind::Multiplicative,
        NoiseKind::Quantization,
        NoiseKind::Dropout,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoiseKind::Gaussian => "gaussian",
            NoiseKind::Multiplicative => "multiplicative",
            NoiseKind::Quantization => "quantization",
            NoiseKind::Dropout => "dropout",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoiseOperator {
    /// Additive N(0, sigma_m) in metres
    Gaussian { sigma_m: f32 },
    /// Range-proportional noise, depth * (1 + N(0, sigma_rel))
    Multiplicative { sigma_rel: f32 },
    /// Rounding to a grid of `step_m` metres
    Quantization { step_m: f32 },
    /// Drops a valid pixel with probability `p` and writes `fill` into it
    Dropout { p: f64, fill: f32 },
}

fn check_magnitude(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(DepthError::ConfigError(format!(
            "{name} must be finite and >= 0, got {value}"
        )));
    }
    Ok(())
}

fn normal(sigma: f32) -> Result<Normal<f32>> {
    Normal::new(0.0, sigma).map_err(|e| DepthError::InvalidValue(format!("sigma {sigma}: {e}")))
}

impl NoiseOperator {
    pub fn gaussian(sigma_m: f32) -> Result<Self> {
        check_magnitude("gaussian.sigma_m", sigma_m)?;
        Ok(NoiseOperator::Gaussian { sigma_m })
    }

    pub fn multiplicative(sigma_rel: f32) -> Result<Self> {
        check_magnitude("multiplicative.sigma_rel", sigma_rel)?;
        Ok(NoiseOperator::Multiplicative { sigma_rel })
    }

    pub fn quantization(step_m: f32) -> Result<Self> {
        check_magnitude("quantization.step_m", step_m)?;
        Ok(NoiseOperator::Quantization { step_m })
    }

    pub fn dropout(p: f64, fill: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&p) {
            return Err(DepthError::ConfigError(format!(
                "dropout.p must be within [0, 1], got {p}"
            )));
        }
        Ok(NoiseOperator::Dropout { p, fill })
    }

    pub fn kind(&self) -> NoiseKind {
        match self {
            NoiseOperator::Gaussian { .. } => NoiseKind::Gaussian,
            NoiseOperator::Multiplicative { .. } => NoiseKind::Multiplicative,
            NoiseOperator::Quantization { .. } => NoiseKind::Quantization,
            NoiseOperator::Dropout { .. } => NoiseKind::Dropout,
        }
    }

    /// True when `apply` would return its inputs untouched.
    pub fn is_noop(&self) -> bool {
        match *self {
            NoiseOperator::Gaussian { sigma_m } => sigma_m <= 0.0,
            NoiseOperator::Multiplicative { sigma_rel } => sigma_rel <= 0.0,
            NoiseOperator::Quantization { step_m } => step_m <= 0.0,
            NoiseOperator::Dropout { p, .. } => p <= 0.0,
        }
    }

    pub fn apply<R: Rng>(
        &self,
        mut frame: DepthFrame,
        mut mask: ValidityMask,
        rng: &mut R,
    ) -> Result<(DepthFrame, ValidityMask)> {
        mask.check_matches(&frame)?;
        if self.is_noop() {
            return Ok((frame, mask));
        }

        let pixels = frame.data.iter_mut().zip(mask.data.iter_mut());
        match *self {
            NoiseOperator::Gaussian { sigma_m } => {
                let dist = normal(sigma_m)?;
                for (value, _) in pixels.filter(|(_, valid)| **valid) {
                    *value += dist.sample(rng);
                }
            }
            NoiseOperator::Multiplicative { sigma_rel } => {
                let dist = normal(sigma_rel)?;
                for (value, _) in pixels.filter(|(_, valid)| **valid) {
                    *value *= 1.0 + dist.sample(rng);
                }
            }
            NoiseOperator::Quantization { step_m } => {
                let step = f64::from(step_m);
                for (value, _) in pixels.filter(|(_, valid)| **valid) {
                    *value = ((f64::from(*value) / step).round() * step) as f32;
                }
            }
            NoiseOperator::Dropout { p, fill } => {
                for (value, valid) in pixels.filter(|(_, valid)| **valid) {
                    if rng.random::<f64>() < p {
                        *value = fill;
                        *valid = false;
                    }
                }
            }
        }
        Ok((frame, mask))
    }
}

impl fmt::Display for NoiseOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoiseOperator::Gaussian { sigma_m } => write!(f, "Gaussian(sigma_m={sigma_m})"),
            NoiseOperator::Multiplicative { sigma_rel } => {
                write!(f, "Multiplicative(sigma_rel={sigma_rel})")
            }
            NoiseOperator::Quantization { step_m } => write!(f, "Quantization(step_m={step_m})"),
            NoiseOperator::Dropout { p, fill } => write!(f, "Dropout(p={p}, fill={fill})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ramp(width: usize, height: usize) -> (DepthFrame, ValidityMask) {
        let data: Vec<f32> = (0..width * height).map(|i| 0.5 + i as f32 * 0.01).collect();
        let frame = DepthFrame::new(width, height, data).unwrap();
        let mask = ValidityMask {
            width,
            height,
            data: (0..width * height).map(|i| i % 3 != 0).collect(),
        };
        (frame, mask)
    }

    fn all_operators() -> Vec<NoiseOperator> {
        vec![
            NoiseOperator::Gaussian { sigma_m: 0.05 },
            NoiseOperator::Multiplicative { sigma_rel: 0.1 },
            NoiseOperator::Quantization { step_m: 0.02 },
            NoiseOperator::Dropout { p: 0.3, fill: 7.0 },
        ]
    }

    #[test]
    fn test_mask_never_widens() {
        let mut rng = StdRng::seed_from_u64(7);
        for op in all_operators() {
            let (frame, mask) = ramp(16, 8);
            let (_, out_mask) = op.apply(frame, mask.clone(), &mut rng).unwrap();
            assert!(out_mask.is_subset_of(&mask), "{op} widened the mask");
        }
    }

    #[test]
    fn test_invalid_pixels_untouched() {
        let mut rng = StdRng::seed_from_u64(11);
        for op in all_operators() {
            let (frame, mask) = ramp(16, 8);
            let (out, _) = op.apply(frame.clone(), mask.clone(), &mut rng).unwrap();
            for i in 0..frame.len() {
                if !mask.data[i] {
                    assert_eq!(out.data[i].to_bits(), frame.data[i].to_bits(), "{op} at {i}");
                }
            }
        }
    }

    #[test]
    fn test_zero_magnitude_is_identity() {
        let mut rng = StdRng::seed_from_u64(3);
        for op in [
            NoiseOperator::Gaussian { sigma_m: 0.0 },
            NoiseOperator::Multiplicative { sigma_rel: 0.0 },
            NoiseOperator::Quantization { step_m: 0.0 },
            NoiseOperator::Dropout { p: 0.0, fill: 0.0 },
        ] {
            assert!(op.is_noop());
            let (frame, mask) = ramp(8, 8);
            let (out, out_mask) = op.apply(frame.clone(), mask.clone(), &mut rng).unwrap();
            assert_eq!(out, frame);
            assert_eq!(out_mask, mask);
        }
    }

    #[test]
    fn test_quantization_rounds_to_grid() {
        let mut rng = StdRng::seed_from_u64(0);
        let frame = DepthFrame::new(1, 1, vec![1.234]).unwrap();
        let mask = ValidityMask::all(1, 1, true);
        let (out, _) = NoiseOperator::Quantization { step_m: 0.1 }
            .apply(frame, mask, &mut rng)
            .unwrap();
        assert_relative_eq!(out.data[0], 1.2, epsilon = 1e-6);
    }

    #[test]
    fn test_quantization_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(0);
        let op = NoiseOperator::Quantization { step_m: 0.013 };
        let (frame, mask) = ramp(32, 32);
        let (once, once_mask) = op.apply(frame, mask, &mut rng).unwrap();
        let (twice, twice_mask) = op.apply(once.clone(), once_mask.clone(), &mut rng).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once_mask, twice_mask);
    }

    #[test]
    fn test_full_dropout() {
        let mut rng = StdRng::seed_from_u64(5);
        let frame = DepthFrame::filled(4, 4, 2.0);
        let mask = ValidityMask::all(4, 4, true);
        let (out, out_mask) = NoiseOperator::Dropout { p: 1.0, fill: 0.0 }
            .apply(frame, mask, &mut rng)
            .unwrap();
        assert!(out.data.iter().all(|&v| v == 0.0));
        assert_eq!(out_mask.count_valid(), 0);
    }

    #[test]
    fn test_dropout_rate() {
        let mut rng = StdRng::seed_from_u64(42);
        let frame = DepthFrame::filled(100, 100, 1.0);
        let mask = ValidityMask::all(100, 100, true);
        let (_, out_mask) = NoiseOperator::Dropout { p: 0.25, fill: 0.0 }
            .apply(frame, mask, &mut rng)
            .unwrap();
        let dropped = 10_000 - out_mask.count_valid();
        assert!((2_200..2_800).contains(&dropped), "dropped {dropped}");
    }

    #[test]
    fn test_gaussian_statistics() {
        let mut rng = StdRng::seed_from_u64(9);
        let frame = DepthFrame::filled(200, 100, 3.0);
        let mask = ValidityMask::all(200, 100, true);
        let (out, out_mask) = NoiseOperator::Gaussian { sigma_m: 0.1 }
            .apply(frame, mask.clone(), &mut rng)
            .unwrap();
        assert_eq!(out_mask, mask);

        let n = out.len() as f64;
        let mean = out.data.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
        let var = out.data.iter().map(|&v| (f64::from(v) - mean).powi(2)).sum::<f64>() / n;
        assert_relative_eq!(mean, 3.0, epsilon = 0.01);
        assert_relative_eq!(var.sqrt(), 0.1, epsilon = 0.01);
    }

    #[test]
    fn test_multiplicative_scales_with_depth() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut data = vec![1.0f32; 5_000];
        data.extend(vec![8.0f32; 5_000]);
        let frame = DepthFrame::new(100, 100, data).unwrap();
        let mask = ValidityMask::all(100, 100, true);
        let (out, _) = NoiseOperator::Multiplicative { sigma_rel: 0.05 }
            .apply(frame, mask, &mut rng)
            .unwrap();

        let spread = |values: &[f32], center: f64| {
            let n = values.len() as f64;
            (values.iter().map(|&v| (f64::from(v) - center).powi(2)).sum::<f64>() / n).sqrt()
        };
        assert_relative_eq!(spread(&out.data[..5_000], 1.0), 0.05, epsilon = 0.005);
        assert_relative_eq!(spread(&out.data[5_000..], 8.0), 0.4, epsilon = 0.04);
    }

    #[test]
    fn test_checked_constructors() {
        assert!(NoiseOperator::gaussian(0.01).is_ok());
        assert!(matches!(NoiseOperator::gaussian(-0.01), Err(DepthError::ConfigError(_))));
        assert!(matches!(NoiseOperator::multiplicative(f32::NAN), Err(DepthError::ConfigError(_))));
        assert!(matches!(NoiseOperator::quantization(f32::INFINITY), Err(DepthError::ConfigError(_))));
        assert!(NoiseOperator::dropout(1.0, 0.0).is_ok());
        assert!(matches!(NoiseOperator::dropout(1.5, 0.0), Err(DepthError::ConfigError(_))));
        assert!(matches!(NoiseOperator::dropout(-0.1, 0.0), Err(DepthError::ConfigError(_))));
    }

    #[test]
    fn test_mismatched_mask_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let frame = DepthFrame::filled(4, 4, 1.0);
        let mask = ValidityMask::all(2, 2, true);
        let result = NoiseOperator::Gaussian { sigma_m: 0.1 }.apply(frame, mask, &mut rng);
        assert!(matches!(result, Err(DepthError::InvalidValue(_))));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(
            NoiseOperator::Dropout { p: 0.5, fill: 0.0 }.to_string(),
            "Dropout(p=0.5, fill=0)"
        );
        assert_eq!(NoiseOperator::Quantization { step_m: 0.1 }.kind(), NoiseKind::Quantization);
    }
}
