//! Depth visualization module
//!
//! Converts metric depth into 16-bit gray or 8-bit marked previews and writes
//! them as PNG or TIFF.

mod writer;
mod image_viz_writer;
mod visualizer;
pub mod types;

pub use writer::VizWriter;
pub use image_viz_writer::ImageVizWriter;
pub use visualizer::Visualizer;
pub use types::{DisplayImage, PreviewFormat, RasterImage, VizEncoding};
