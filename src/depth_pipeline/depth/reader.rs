use crate::depth_pipeline::common::error::Result;
use crate::depth_pipeline::depth::types::DepthFrame;

pub trait DepthReader {
    fn read_depth(&self, data: &[u8]) -> Result<DepthFrame>;
}
