use std::io::Write;

use tracing::debug;

use crate::depth_pipeline::common::error::{DepthError, Result};
use crate::depth_pipeline::config::types::PipelineConfig;
use crate::depth_pipeline::depth::exr_codec::{decode_exr, encode_exr};
use crate::depth_pipeline::depth::reader::DepthReader;
use crate::depth_pipeline::depth::tiff_codec::{decode_tiff, encode_tiff};
use crate::depth_pipeline::depth::types::{DepthFormat, DepthFrame};
use crate::depth_pipeline::depth::writer::DepthWriter;

/// Depth codec backed by `exr` and `tiff`.
///
/// Reading detects the container from its magic bytes, so ground truth written
/// by the renderer and files written by this crate go through the same path.
pub struct StandardDepthCodec;

impl DepthReader for StandardDepthCodec {
    fn read_depth(&self, data: &[u8]) -> Result<DepthFrame> {
        match DepthFormat::sniff(data) {
            Some(DepthFormat::Exr) => decode_exr(data),
            Some(DepthFormat::Tiff) => decode_tiff(data),
            None => Err(DepthError::DecodeError(
                "unrecognized depth container (expected EXR or TIFF)".to_string(),
            )),
        }
    }
}

impl DepthWriter for StandardDepthCodec {
    fn write_depth(
        &self,
        frame: &DepthFrame,
        format: DepthFormat,
        output: &mut dyn Write,
        config: &PipelineConfig,
    ) -> Result<()> {
        let buffer = match format {
            DepthFormat::Exr => encode_exr(frame)?,
            DepthFormat::Tiff => encode_tiff(frame, config.tiff_compression)?,
        };
        output.write_all(&buffer)?;
        debug!("Wrote {:?} depth, {} bytes", format, buffer.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_back_both_containers() {
        let frame = DepthFrame::new(2, 2, vec![0.5, 1.0, 0.0, 12.0]).unwrap();
        let config = PipelineConfig::default();

        for format in [DepthFormat::Exr, DepthFormat::Tiff] {
            let mut bytes = Vec::new();
            StandardDepthCodec
                .write_depth(&frame, format, &mut bytes, &config)
                .unwrap();
            assert_eq!(DepthFormat::sniff(&bytes), Some(format));
            assert_eq!(StandardDepthCodec.read_depth(&bytes).unwrap(), frame);
        }
    }

    #[test]
    fn test_unknown_container_rejected() {
        let result = StandardDepthCodec.read_depth(b"P5\n2 2\n255\n");
        assert!(matches!(result, Err(DepthError::DecodeError(_))));
    }
}
