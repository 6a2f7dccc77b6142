//! `[noise]` table of the scene configuration.

use std::collections::HashSet;

use serde::Deserialize;

use crate::depth_pipeline::common::error::{DepthError, Result};
use crate::depth_pipeline::noise::operator::{NoiseKind, NoiseOperator};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GaussianNoiseConfig {
    pub enabled: bool,
    pub sigma_m: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MultiplicativeNoiseConfig {
    pub enabled: bool,
    pub sigma_rel: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QuantizationNoiseConfig {
    pub enabled: bool,
    pub step_m: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DropoutNoiseConfig {
    pub enabled: bool,
    pub p: f64,
    pub fill: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Master switch; when false the noise batch only renders previews
    pub enabled: bool,
    /// Base seed for reproducible noise; frame `i` uses `seed + i`
    pub seed: Option<u64>,
    /// Application order; defaults to gaussian, multiplicative, quantization, dropout
    pub order: Option<Vec<NoiseKind>>,
    pub gaussian: GaussianNoiseConfig,
    pub multiplicative: MultiplicativeNoiseConfig,
    pub quantization: QuantizationNoiseConfig,
    pub dropout: DropoutNoiseConfig,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            seed: None,
            order: None,
            gaussian: GaussianNoiseConfig::default(),
            multiplicative: MultiplicativeNoiseConfig::default(),
            quantization: QuantizationNoiseConfig::default(),
            dropout: DropoutNoiseConfig::default(),
        }
    }
}

impl NoiseConfig {
    pub fn order(&self) -> Vec<NoiseKind> {
        self.order
            .clone()
            .unwrap_or_else(|| NoiseKind::DEFAULT_ORDER.to_vec())
    }

    /// The operator for `kind`, or `None` when its table is disabled.
    pub fn operator(&self, kind: NoiseKind) -> Result<Option<NoiseOperator>> {
        let op = match kind {
            NoiseKind::Gaussian if self.gaussian.enabled => {
                NoiseOperator::gaussian(self.gaussian.sigma_m)?
            }
            NoiseKind::Multiplicative if self.multiplicative.enabled => {
                NoiseOperator::multiplicative(self.multiplicative.sigma_rel)?
            }
            NoiseKind::Quantization if self.quantization.enabled => {
                NoiseOperator::quantization(self.quantization.step_m)?
            }
            NoiseKind::Dropout if self.dropout.enabled => {
                NoiseOperator::dropout(self.dropout.p, self.dropout.fill)?
            }
            _ => return Ok(None),
        };
        Ok(Some(op))
    }

    /// Rejects out-of-domain parameters of enabled operators, repeated
    /// entries in `order`, and enabled operators an explicit `order` leaves out.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        if let Some(order) = &self.order {
            for kind in order {
                if !seen.insert(*kind) {
                    return Err(DepthError::ConfigError(format!(
                        "noise.order lists '{}' more than once",
                        kind.as_str()
                    )));
                }
            }
        }
        for kind in NoiseKind::DEFAULT_ORDER {
            let active = self.operator(kind)?.is_some_and(|op| !op.is_noop());
            if active && self.order.is_some() && !seen.contains(&kind) {
                return Err(DepthError::ConfigError(format!(
                    "noise.{} is enabled but missing from noise.order",
                    kind.as_str()
                )));
            }
        }
        Ok(())
    }
}
