use std::io::Write;
use crate::depth_pipeline::common::error::Result;
use crate::depth_pipeline::config::types::PipelineConfig;
use crate::depth_pipeline::depth::types::{DepthFormat, DepthFrame};

pub trait DepthWriter {
    fn write_depth(
        &self,
        frame: &DepthFrame,
        format: DepthFormat,
        output: &mut dyn Write,
        config: &PipelineConfig,
    ) -> Result<()>;
}
