//! Depth file module
//!
//! Lossless single-channel float depth in OpenEXR or TIFF containers.

mod reader;
mod writer;
mod exr_codec;
mod tiff_codec;
mod standard_codec;
pub mod types;

pub use reader::DepthReader;
pub use writer::DepthWriter;
pub use exr_codec::{decode_exr, encode_exr};
pub use tiff_codec::{decode_tiff, encode_tiff};
pub use standard_codec::StandardDepthCodec;
pub use types::{DepthFormat, DepthFrame, ValidityMask};
