//! Common utilities module
//!
//! This module contains shared utilities used across the depth pipeline.

pub mod error;
pub mod timing;

pub use error::{DepthError, ErrorKind, Result};
pub use timing::{BatchSummary, FrameTimings, StepTiming, Timer};
