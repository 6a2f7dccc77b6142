//! Depth post-processing pipeline module
//!
//! Structured around the renderer's output: depth file codecs, validity
//! rules, sensor-noise synthesis, preview rendering and the batch
//! orchestration that ties them to a scene manifest.

pub mod common;
pub mod config;
pub mod conversions;
pub mod depth;
pub mod manifest;
pub mod noise;
pub mod validity;
pub mod viz;

pub use common::{
    BatchSummary,
    DepthError,
    ErrorKind,
    FrameTimings,
    Result,
};

pub use config::{
    PipelineConfig,
    PipelineConfigBuilder,
    SceneConfig,
    TiffCompression,
};

pub use depth::{
    DepthFormat,
    DepthFrame,
    DepthReader,
    DepthWriter,
    StandardDepthCodec,
    ValidityMask,
};

pub use noise::{
    NoiseChain,
    NoiseConfig,
    NoiseKind,
    NoiseOperator,
};

pub use validity::ValidityPolicy;

pub use viz::{
    DisplayImage,
    ImageVizWriter,
    PreviewFormat,
    VizEncoding,
    VizWriter,
    Visualizer,
};

pub use manifest::Manifest;

pub use conversions::{
    BatchReport,
    DepthPostprocessPipeline,
};
