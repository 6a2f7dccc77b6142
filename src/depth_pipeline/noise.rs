//! Depth noise module
//!
//! Sensor-noise operators over metric depth and their ordered composition.

mod chain;
pub mod config;
pub mod operator;

pub use chain::NoiseChain;
pub use config::{
    DropoutNoiseConfig, GaussianNoiseConfig, MultiplicativeNoiseConfig, NoiseConfig,
    QuantizationNoiseConfig,
};
pub use operator::{NoiseKind, NoiseOperator};
