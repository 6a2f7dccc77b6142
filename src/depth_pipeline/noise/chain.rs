use std::fmt;

use rand::Rng;
use tracing::{debug, trace};

use crate::depth_pipeline::common::error::Result;
use crate::depth_pipeline::depth::types::{DepthFrame, ValidityMask};
use crate::depth_pipeline::noise::config::NoiseConfig;
use crate::depth_pipeline::noise::operator::NoiseOperator;
use crate::depth_pipeline::validity::ValidityPolicy;

/// Ordered list of noise operators. Operators run in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoiseChain {
    operators: Vec<NoiseOperator>,
}

impl NoiseChain {
    pub fn new(operators: Vec<NoiseOperator>) -> Self {
        Self { operators }
    }

    /// Builds the chain described by a `[noise]` table.
    ///
    /// Disabled and zero-magnitude operators are left out. A globally disabled
    /// noise table yields an empty chain.
    pub fn from_config(config: &NoiseConfig) -> Result<Self> {
        config.validate()?;
        if !config.enabled {
            return Ok(Self::default());
        }
        let mut chain = Self::default();
        for kind in config.order() {
            if let Some(op) = config.operator(kind)? {
                if !op.is_noop() {
                    chain.push(op);
                }
            }
        }
        Ok(chain)
    }

    pub fn push(&mut self, operator: NoiseOperator) {
        self.operators.push(operator);
    }

    pub fn operators(&self) -> &[NoiseOperator] {
        &self.operators
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// Applies the chain and returns the sanitized frame together with the
    /// mask re-derived from it.
    pub fn run_with_mask<R: Rng>(
        &self,
        frame: DepthFrame,
        policy: &ValidityPolicy,
        rng: &mut R,
    ) -> Result<(DepthFrame, ValidityMask)> {
        let mut mask = policy.initial_mask(&frame);
        debug!(
            valid = mask.count_valid(),
            pixels = frame.len(),
            zmax = policy.zmax,
            "Initial validity"
        );

        let mut frame = frame;
        for op in &self.operators {
            let (next_frame, next_mask) = op.apply(frame, mask, rng)?;
            trace!(operator = %op, valid = next_mask.count_valid(), "Applied noise");
            frame = next_frame;
            mask = next_mask;
        }

        let (frame, mask) = policy.sanitize(frame);
        debug!(valid = mask.count_valid(), "Sanitized noisy depth");
        Ok((frame, mask))
    }

    pub fn run<R: Rng>(
        &self,
        frame: DepthFrame,
        policy: &ValidityPolicy,
        rng: &mut R,
    ) -> Result<DepthFrame> {
        self.run_with_mask(frame, policy, rng).map(|(frame, _)| frame)
    }
}

impl fmt::Display for NoiseChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, op) in self.operators.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{op}")?;
        }
        write!(f, "]")
    }
}
