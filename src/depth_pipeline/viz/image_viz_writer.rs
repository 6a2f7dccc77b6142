use std::io::{Cursor, Write};

use image::{DynamicImage, ImageBuffer, ImageFormat, Luma, Rgb};
use tracing::debug;

use crate::depth_pipeline::common::error::{DepthError, Result};
use crate::depth_pipeline::viz::types::{DisplayImage, PreviewFormat};
use crate::depth_pipeline::viz::writer::VizWriter;

/// Preview writer backed by the `image` crate.
pub struct ImageVizWriter;

fn to_dynamic(image: &DisplayImage) -> Result<DynamicImage> {
    let (width, height) = image.dimensions();
    let bad_buffer = || DepthError::EncodeError(format!("preview buffer does not match {width}x{height}"));
    let dynamic = match image {
        DisplayImage::Gray16(img) => DynamicImage::ImageLuma16(
            ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(width as u32, height as u32, img.data.clone())
                .ok_or_else(bad_buffer)?,
        ),
        DisplayImage::Rgb8(img) => DynamicImage::ImageRgb8(
            ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(width as u32, height as u32, img.data.clone())
                .ok_or_else(bad_buffer)?,
        ),
    };
    Ok(dynamic)
}

impl VizWriter for ImageVizWriter {
    fn write_viz(&self, image: &DisplayImage, format: PreviewFormat, output: &mut dyn Write) -> Result<()> {
        let (width, height) = image.dimensions();
        debug!("Encoding {:?} preview: {}x{}", format, width, height);

        let image_format = match format {
            PreviewFormat::Png => ImageFormat::Png,
            PreviewFormat::Tiff => ImageFormat::Tiff,
        };

        let mut buffer = Vec::new();
        to_dynamic(image)?
            .write_to(&mut Cursor::new(&mut buffer), image_format)
            .map_err(|e| DepthError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;

        debug!("Preview encoding complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth_pipeline::viz::types::RasterImage;

    #[test]
    fn test_gray16_png_keeps_full_range() {
        let image = DisplayImage::Gray16(RasterImage {
            width: 3,
            height: 1,
            channels: 1,
            data: vec![0, 1, 65535],
        });
        let mut bytes = Vec::new();
        ImageVizWriter.write_viz(&image, PreviewFormat::Png, &mut bytes).unwrap();

        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        let luma = decoded.as_luma16().expect("16-bit gray");
        assert_eq!(luma.as_raw(), &vec![0, 1, 65535]);
    }

    #[test]
    fn test_rgb8_tiff() {
        let image = DisplayImage::Rgb8(RasterImage {
            width: 2,
            height: 1,
            channels: 3,
            data: vec![0, 180, 0, 40, 40, 40],
        });
        let mut bytes = Vec::new();
        ImageVizWriter.write_viz(&image, PreviewFormat::Tiff, &mut bytes).unwrap();

        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Tiff).unwrap();
        assert_eq!(decoded.to_rgb8().as_raw(), &vec![0, 180, 0, 40, 40, 40]);
    }

    #[test]
    fn test_short_buffer_is_encode_error() {
        let image = DisplayImage::Rgb8(RasterImage {
            width: 4,
            height: 4,
            channels: 3,
            data: vec![0; 5],
        });
        let mut bytes = Vec::new();
        let result = ImageVizWriter.write_viz(&image, PreviewFormat::Png, &mut bytes);
        assert!(matches!(result, Err(DepthError::EncodeError(_))));
        assert!(bytes.is_empty());
    }
}
