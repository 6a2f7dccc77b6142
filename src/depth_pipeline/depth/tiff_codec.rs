//! 32-bit float TIFF depth encoding and decoding.

use std::io::Cursor;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, compression::DeflateLevel, Compression, TiffEncoder};
use tracing::debug;

use crate::depth_pipeline::common::error::{DepthError, Result};
use crate::depth_pipeline::config::types::TiffCompression;
use crate::depth_pipeline::depth::types::DepthFrame;

fn to_tiff_compression(compression: TiffCompression) -> Compression {
    match compression {
        TiffCompression::None => Compression::Uncompressed,
        TiffCompression::Lzw => Compression::Lzw,
        TiffCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
        TiffCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
        TiffCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
    }
}

pub fn decode_tiff(data: &[u8]) -> Result<DepthFrame> {
    debug!("Decoding TIFF depth, {} bytes", data.len());

    let mut decoder =
        Decoder::new(Cursor::new(data)).map_err(|e| DepthError::DecodeError(e.to_string()))?;
    let (width, height) = decoder
        .dimensions()
        .map_err(|e| DepthError::DecodeError(e.to_string()))?;
    let (width, height) = (width as usize, height as usize);

    let samples: Vec<f32> = match decoder
        .read_image()
        .map_err(|e| DepthError::DecodeError(e.to_string()))?
    {
        DecodingResult::F32(values) => values,
        DecodingResult::F64(values) => values.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U16(values) => values.into_iter().map(f32::from).collect(),
        DecodingResult::U8(values) => values.into_iter().map(f32::from).collect(),
        _ => {
            return Err(DepthError::UnsupportedFormat(
                "TIFF sample type is not a depth type".to_string(),
            ));
        }
    };

    let pixels = width * height;
    if pixels == 0 || samples.len() % pixels != 0 {
        return Err(DepthError::DecodeError(format!(
            "{} samples do not tile a {}x{} image",
            samples.len(),
            width,
            height
        )));
    }
    let channels = samples.len() / pixels;
    debug!("Decoded TIFF: {}x{}, {} channel(s)", width, height, channels);

    let data = if channels == 1 {
        samples
    } else {
        samples.into_iter().step_by(channels).collect()
    };
    DepthFrame::new(width, height, data)
}

pub fn encode_tiff(frame: &DepthFrame, compression: TiffCompression) -> Result<Vec<u8>> {
    debug!("Encoding TIFF depth: {}x{}", frame.width, frame.height);

    let mut buffer = Vec::new();

    {
        let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer))
            .map_err(|e| DepthError::EncodeError(e.to_string()))?
            .with_compression(to_tiff_compression(compression));

        encoder
            .write_image::<colortype::Gray32Float>(
                frame.width as u32,
                frame.height as u32,
                &frame.data,
            )
            .map_err(|e| DepthError::EncodeError(e.to_string()))?;
    }

    debug!("TIFF encoding complete");
    Ok(buffer)
}
