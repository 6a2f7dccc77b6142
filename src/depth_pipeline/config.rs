//! Configuration module
//!
//! Scene file parsing and the options that drive the post-processing batches.

pub mod scene;
pub mod types;

pub use scene::{MANIFEST_FILE, RenderConfig, SceneConfig};
pub use types::{PipelineConfig, PipelineConfigBuilder, TiffCompression};
