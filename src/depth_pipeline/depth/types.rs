//! Depth raster types

use std::path::Path;

use crate::depth_pipeline::common::error::{DepthError, Result};

/// Metric depth grid, one `f32` per pixel in metres, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthFrame {
    /// Width of the frame in pixels
    pub width: usize,
    /// Height of the frame in pixels
    pub height: usize,
    /// Depth values in metres
    pub data: Vec<f32>,
}

impl DepthFrame {
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != width * height {
            return Err(DepthError::InvalidDimensions(width, height));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }
}

/// Per-pixel trust flags for a [`DepthFrame`]; `true` means the measurement is usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityMask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<bool>,
}

impl ValidityMask {
    pub fn from_fn(frame: &DepthFrame, mut is_valid: impl FnMut(f32) -> bool) -> Self {
        Self {
            width: frame.width,
            height: frame.height,
            data: frame.data.iter().map(|&v| is_valid(v)).collect(),
        }
    }

    pub fn all(width: usize, height: usize, valid: bool) -> Self {
        Self {
            width,
            height,
            data: vec![valid; width * height],
        }
    }

    pub fn count_valid(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// True when every pixel valid in `self` is also valid in `other`.
    pub fn is_subset_of(&self, other: &ValidityMask) -> bool {
        self.data.len() == other.data.len()
            && self.data.iter().zip(&other.data).all(|(&a, &b)| !a || b)
    }

    pub(crate) fn check_matches(&self, frame: &DepthFrame) -> Result<()> {
        if self.width != frame.width || self.height != frame.height || self.data.len() != frame.data.len() {
            return Err(DepthError::InvalidValue(format!(
                "mask {}x{} does not match frame {}x{}",
                self.width, self.height, frame.width, frame.height
            )));
        }
        Ok(())
    }
}

/// Lossless float containers supported for depth files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFormat {
    /// OpenEXR, single `Z` channel
    Exr,
    /// 32-bit float grayscale TIFF
    Tiff,
}

const EXR_MAGIC: [u8; 4] = [0x76, 0x2f, 0x31, 0x01];
const TIFF_MAGIC_LE: [u8; 4] = *b"II*\0";
const TIFF_MAGIC_BE: [u8; 4] = *b"MM\0*";

impl DepthFormat {
    /// Picks the container from a destination file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("exr") => Ok(DepthFormat::Exr),
            Some("tif") | Some("tiff") => Ok(DepthFormat::Tiff),
            _ => Err(DepthError::UnsupportedFormat(format!(
                "no depth container for {}",
                path.display()
            ))),
        }
    }

    /// Detects the container from the leading magic bytes.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        let head: [u8; 4] = data.get(..4)?.try_into().ok()?;
        match head {
            EXR_MAGIC => Some(DepthFormat::Exr),
            TIFF_MAGIC_LE | TIFF_MAGIC_BE => Some(DepthFormat::Tiff),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rejects_mismatched_buffer() {
        assert!(matches!(
            DepthFrame::new(4, 4, vec![0.0; 15]),
            Err(DepthError::InvalidDimensions(4, 4))
        ));
        let frame = DepthFrame::new(2, 1, vec![1.0, 2.0]).unwrap();
        assert_eq!(frame.get(1, 0), Some(2.0));
        assert_eq!(frame.get(2, 0), None);
    }

    #[test]
    fn test_mask_subset() {
        let wide = ValidityMask { width: 3, height: 1, data: vec![true, true, false] };
        let narrow = ValidityMask { width: 3, height: 1, data: vec![true, false, false] };
        assert!(narrow.is_subset_of(&wide));
        assert!(!wide.is_subset_of(&narrow));
        assert_eq!(wide.count_valid(), 2);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DepthFormat::from_path(Path::new("a/frame_0000.exr")).unwrap(), DepthFormat::Exr);
        assert_eq!(DepthFormat::from_path(Path::new("a/frame_0000.TIFF")).unwrap(), DepthFormat::Tiff);
        assert!(DepthFormat::from_path(Path::new("a/frame_0000.png")).is_err());
    }

    #[test]
    fn test_format_sniff() {
        assert_eq!(DepthFormat::sniff(&[0x76, 0x2f, 0x31, 0x01, 2, 0]), Some(DepthFormat::Exr));
        assert_eq!(DepthFormat::sniff(b"II*\0rest"), Some(DepthFormat::Tiff));
        assert_eq!(DepthFormat::sniff(b"\x89PNG"), None);
        assert_eq!(DepthFormat::sniff(b"II"), None);
    }
}
