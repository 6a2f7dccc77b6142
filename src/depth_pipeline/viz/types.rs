//! Preview raster types

use std::path::Path;

use crate::depth_pipeline::common::error::{DepthError, Result};

/// Output encoding of a depth preview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VizEncoding {
    /// Single channel 16-bit; 0 marks invalid pixels
    Gray16,
    /// 3-channel 8-bit gray with invalid pixels painted `invalid_color`
    Rgb8 { invalid_color: [u8; 3] },
}

impl VizEncoding {
    /// 8-bit colour when a marker colour is configured, 16-bit gray otherwise.
    pub fn from_invalid_color(color: Option<[u8; 3]>) -> Self {
        match color {
            Some(invalid_color) => VizEncoding::Rgb8 { invalid_color },
            None => VizEncoding::Gray16,
        }
    }
}

/// Interleaved raster, `channels` samples per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage<T> {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<T>,
}

impl<T: Copy> RasterImage<T> {
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[T]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y * self.width + x) * self.channels;
        self.data.get(start..start + self.channels)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayImage {
    Gray16(RasterImage<u16>),
    Rgb8(RasterImage<u8>),
}

impl DisplayImage {
    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            DisplayImage::Gray16(img) => (img.width, img.height),
            DisplayImage::Rgb8(img) => (img.width, img.height),
        }
    }
}

/// Containers supported for preview images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewFormat {
    Png,
    Tiff,
}

impl PreviewFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => Ok(PreviewFormat::Png),
            Some("tif") | Some("tiff") => Ok(PreviewFormat::Tiff),
            _ => Err(DepthError::UnsupportedFormat(format!(
                "no preview container for {}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_format_from_extension() {
        assert_eq!(PreviewFormat::from_path(Path::new("depth_viz/frame_0000.png")).unwrap(), PreviewFormat::Png);
        assert_eq!(PreviewFormat::from_path(Path::new("x.TIF")).unwrap(), PreviewFormat::Tiff);
        assert!(PreviewFormat::from_path(Path::new("x.jpg")).is_err());
        assert!(PreviewFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_encoding_from_color() {
        assert_eq!(VizEncoding::from_invalid_color(None), VizEncoding::Gray16);
        assert_eq!(
            VizEncoding::from_invalid_color(Some([0, 180, 0])),
            VizEncoding::Rgb8 { invalid_color: [0, 180, 0] }
        );
    }
}
