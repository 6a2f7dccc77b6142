use tracing::debug;

use crate::depth_pipeline::common::error::Result;
use crate::depth_pipeline::depth::types::DepthFrame;
use crate::depth_pipeline::validity::{ValidityPolicy, validate_zmax};
use crate::depth_pipeline::viz::types::{DisplayImage, RasterImage, VizEncoding};

const GRAY16_MAX: f32 = u16::MAX as f32;
const GRAY8_MAX: f32 = u8::MAX as f32;

/// Maps metric depth into a bounded preview encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visualizer {
    pub encoding: VizEncoding,
}

impl Visualizer {
    pub fn new(encoding: VizEncoding) -> Self {
        Self { encoding }
    }

    /// Display ceiling: `zmax` when configured, else the largest valid depth,
    /// else 1.0.
    pub fn display_ceiling(frame: &DepthFrame, zmax: f32) -> f32 {
        if zmax > 0.0 {
            return zmax;
        }
        let policy = ValidityPolicy::new(zmax);
        frame
            .data
            .iter()
            .copied()
            .filter(|&v| policy.is_valid(v))
            .fold(None, |acc: Option<f32>, v| Some(acc.map_or(v, |m| m.max(v))))
            .unwrap_or(1.0)
    }

    pub fn to_display(&self, frame: &DepthFrame, zmax: f32) -> Result<DisplayImage> {
        let zmax = validate_zmax(zmax)?;
        let policy = ValidityPolicy::new(zmax);
        let ceiling = Self::display_ceiling(frame, zmax);
        debug!(
            width = frame.width,
            height = frame.height,
            ceiling,
            encoding = ?self.encoding,
            "Rendering depth preview"
        );

        let normalized = frame.data.iter().map(|&v| {
            policy
                .is_valid(v)
                .then(|| v.clamp(0.0, ceiling) / ceiling)
        });

        let image = match self.encoding {
            VizEncoding::Gray16 => DisplayImage::Gray16(RasterImage {
                width: frame.width,
                height: frame.height,
                channels: 1,
                data: normalized
                    .map(|n| match n {
                        // 0 is reserved for invalid pixels
                        Some(n) => ((n * GRAY16_MAX).round() as u16).max(1),
                        None => 0,
                    })
                    .collect(),
            }),
            VizEncoding::Rgb8 { invalid_color } => DisplayImage::Rgb8(RasterImage {
                width: frame.width,
                height: frame.height,
                channels: 3,
                data: normalized
                    .flat_map(|n| match n {
                        Some(n) => {
                            let g = (n * GRAY8_MAX).round() as u8;
                            [g, g, g]
                        }
                        None => invalid_color,
                    })
                    .collect(),
            }),
        };
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth_pipeline::common::error::DepthError;

    const GREEN: [u8; 3] = [0, 180, 0];

    fn gray16(image: DisplayImage) -> Vec<u16> {
        match image {
            DisplayImage::Gray16(img) => {
                assert_eq!(img.channels, 1);
                img.data
            }
            other => panic!("expected Gray16, got {other:?}"),
        }
    }

    fn rgb8(image: DisplayImage) -> RasterImage<u8> {
        match image {
            DisplayImage::Rgb8(img) => img,
            other => panic!("expected Rgb8, got {other:?}"),
        }
    }

    #[test]
    fn test_auto_ceiling_single_valid_pixel() {
        let frame = DepthFrame::new(3, 1, vec![3.0, 0.0, f32::NAN]).unwrap();
        assert_eq!(Visualizer::display_ceiling(&frame, 0.0), 3.0);

        let data = gray16(Visualizer::new(VizEncoding::Gray16).to_display(&frame, 0.0).unwrap());
        assert_eq!(data, vec![65535, 0, 0]);

        let img = rgb8(
            Visualizer::new(VizEncoding::Rgb8 { invalid_color: GREEN })
                .to_display(&frame, 0.0)
                .unwrap(),
        );
        assert_eq!(img.pixel(0, 0), Some(&[255, 255, 255][..]));
        assert_eq!(img.pixel(1, 0), Some(&GREEN[..]));
    }

    #[test]
    fn test_ceiling_falls_back_when_nothing_valid() {
        let frame = DepthFrame::new(2, 1, vec![-1.0, f32::INFINITY]).unwrap();
        assert_eq!(Visualizer::display_ceiling(&frame, 0.0), 1.0);
        let data = gray16(Visualizer::new(VizEncoding::Gray16).to_display(&frame, 0.0).unwrap());
        assert_eq!(data, vec![0, 0]);
    }

    #[test]
    fn test_gray16_linear_mapping() {
        let frame = DepthFrame::new(4, 1, vec![10.0, 5.0, 2.5, 12.0]).unwrap();
        let data = gray16(Visualizer::new(VizEncoding::Gray16).to_display(&frame, 10.0).unwrap());
        // 12.0 is beyond zmax and therefore invalid
        assert_eq!(data, vec![65535, 32768, 16384, 0]);
    }

    #[test]
    fn test_tiny_valid_depth_is_not_confused_with_invalid() {
        let frame = DepthFrame::new(2, 1, vec![1.0e-6, 0.0]).unwrap();
        let data = gray16(Visualizer::new(VizEncoding::Gray16).to_display(&frame, 10.0).unwrap());
        assert_eq!(data, vec![1, 0]);
    }

    #[test]
    fn test_rgb8_bounds_and_marker() {
        let values: Vec<f32> = (0..64).map(|i| i as f32 * 0.25 - 2.0).collect();
        let frame = DepthFrame::new(8, 8, values.clone()).unwrap();
        let img = rgb8(
            Visualizer::new(VizEncoding::Rgb8 { invalid_color: GREEN })
                .to_display(&frame, 10.0)
                .unwrap(),
        );

        assert_eq!(img.data.len(), 64 * 3);
        let policy = ValidityPolicy::new(10.0);
        for (i, &v) in values.iter().enumerate() {
            let px = img.pixel(i % 8, i / 8).unwrap();
            if policy.is_valid(v) {
                let expected = (v / 10.0 * 255.0).round() as u8;
                assert_eq!(px, &[expected, expected, expected][..], "value {v}");
            } else {
                assert_eq!(px, &GREEN[..], "value {v}");
            }
        }
    }

    #[test]
    fn test_rejects_degenerate_zmax() {
        let frame = DepthFrame::filled(2, 2, 1.0);
        let viz = Visualizer::new(VizEncoding::Gray16);
        assert!(matches!(viz.to_display(&frame, f32::NAN), Err(DepthError::InvalidValue(_))));
        assert!(matches!(viz.to_display(&frame, -3.0), Err(DepthError::InvalidValue(_))));
    }
}
