//! Pipeline conversions module
//!
//! Orchestration of the depth post-processing batches: ground-truth clamp,
//! noise injection and preview rendering over a renderer manifest.

mod pipeline;
mod report;
mod noise_batch;
mod viz_batch;


pub use pipeline::DepthPostprocessPipeline;
pub use report::BatchReport;
pub use noise_batch::{abs_diff_stats, frame_rng};
