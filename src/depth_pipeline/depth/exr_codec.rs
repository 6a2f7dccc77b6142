//! OpenEXR depth encoding and decoding.
//!
//! Depth is stored as a single full-float channel named `Z`. Multichannel files
//! produced by a renderer are accepted; the depth channel is picked by name and
//! the first channel is used otherwise.

use std::io::Cursor;

use exr::prelude::*;
use tracing::debug;

use crate::depth_pipeline::common::error::{DepthError, Result};
use crate::depth_pipeline::depth::types::DepthFrame;

const DEPTH_CHANNEL: &str = "Z";

fn is_depth_channel(name: &str) -> bool {
    name.eq_ignore_ascii_case(DEPTH_CHANNEL)
        || name
            .rsplit_once('.')
            .is_some_and(|(_, suffix)| suffix.eq_ignore_ascii_case(DEPTH_CHANNEL))
}

fn widen_samples(samples: &FlatSamples) -> Vec<f32> {
    match samples {
        FlatSamples::F32(values) => values.clone(),
        FlatSamples::F16(values) => values.iter().map(|h| h.to_f32()).collect(),
        FlatSamples::U32(values) => values.iter().map(|&v| v as f32).collect(),
    }
}

pub fn decode_exr(data: &[u8]) -> Result<DepthFrame> {
    debug!("Decoding EXR depth, {} bytes", data.len());

    let image = read()
        .no_deep_data()
        .largest_resolution_level()
        .all_channels()
        .first_valid_layer()
        .all_attributes()
        .from_buffered(Cursor::new(data))
        .map_err(|e| DepthError::DecodeError(e.to_string()))?;

    let layer = image.layer_data;
    let (width, height) = (layer.size.0, layer.size.1);
    let channels = &layer.channel_data.list;

    let channel = channels
        .iter()
        .find(|c| is_depth_channel(&c.name.to_string()))
        .or_else(|| channels.first())
        .ok_or_else(|| DepthError::DecodeError("EXR layer has no channels".to_string()))?;

    debug!(
        "Decoded EXR: {}x{}, {} channel(s), using '{}'",
        width,
        height,
        channels.len(),
        channel.name
    );

    let data = widen_samples(&channel.sample_data);
    if data.len() != width * height {
        // subsampled channels are not depth
        return Err(DepthError::DecodeError(format!(
            "channel '{}' has {} samples for a {}x{} image",
            channel.name,
            data.len(),
            width,
            height
        )));
    }
    DepthFrame::new(width, height, data)
}

pub fn encode_exr(frame: &DepthFrame) -> Result<Vec<u8>> {
    debug!("Encoding EXR depth: {}x{}", frame.width, frame.height);

    let name = Text::new_or_none(DEPTH_CHANNEL)
        .ok_or_else(|| DepthError::EncodeError("invalid EXR channel name".to_string()))?;
    let mut list = SmallVec::<[AnyChannel<FlatSamples>; 4]>::new();
    list.push(AnyChannel {
        name,
        sample_data: FlatSamples::F32(frame.data.clone()),
        quantize_linearly: true,
        sampling: Vec2(1, 1),
    });

    let image = Image::from_channels((frame.width, frame.height), AnyChannels::sort(list));

    let mut buffer = Vec::new();
    image
        .write()
        .to_buffered(Cursor::new(&mut buffer))
        .map_err(|e| DepthError::EncodeError(e.to_string()))?;

    debug!("EXR encoding complete, {} bytes", buffer.len());
    Ok(buffer)
}
