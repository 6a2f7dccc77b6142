use std::io::Write;
use crate::depth_pipeline::common::error::Result;
use crate::depth_pipeline::viz::types::{DisplayImage, PreviewFormat};

pub trait VizWriter {
    fn write_viz(&self, image: &DisplayImage, format: PreviewFormat, output: &mut dyn Write) -> Result<()>;
}
