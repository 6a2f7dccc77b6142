//! Post-processing pipeline options

use serde::Deserialize;

/// TIFF compression methods for float depth files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression (slow, good compression)
    Lzw,
    /// Deflate compression - fast level
    DeflateFast,
    /// Deflate compression - best compression (slower)
    DeflateBest,
    /// Deflate compression - balanced (default)
    DeflateBalanced,
}

/// Options shared by the noise and visualization batches.
///
/// Read from the optional `[pipeline]` table of the scene file; every key
/// falls back to [`PipelineConfig::default`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Value written into pixels that end up invalid after noise
    pub invalid_fill: f32,
    /// Whether zero and negative depths count as invalid during sanitize
    pub treat_non_positive_as_invalid: bool,
    /// Marker colour for invalid pixels in the visualization batch.
    /// `None` writes 16-bit single channel previews instead.
    pub invalid_color: Option<[u8; 3]>,
    /// Marker colour for the previews written by the noise batch
    pub noise_viz_invalid_color: Option<[u8; 3]>,
    /// Compression used when depth is written as TIFF
    pub tiff_compression: TiffCompression,
    /// Whether to reject empty frames and frames not matching `expected_dimensions`
    pub validate_dimensions: bool,
    /// Render resolution the depth files are expected to have
    #[serde(skip)]
    pub expected_dimensions: Option<(usize, usize)>,
    /// Write the zmax-clamped ground truth back over the source file
    pub rewrite_clamped_gt: bool,
    /// Abort the batch on the first failed frame
    pub fail_fast: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            invalid_fill: 0.0,
            treat_non_positive_as_invalid: true,
            invalid_color: Some([0, 180, 0]),
            noise_viz_invalid_color: None,
            tiff_compression: TiffCompression::DeflateBalanced,
            validate_dimensions: true,
            expected_dimensions: None,
            rewrite_clamped_gt: true,
            fail_fast: true,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    invalid_fill: Option<f32>,
    treat_non_positive_as_invalid: Option<bool>,
    invalid_color: Option<Option<[u8; 3]>>,
    noise_viz_invalid_color: Option<Option<[u8; 3]>>,
    tiff_compression: Option<TiffCompression>,
    validate_dimensions: Option<bool>,
    expected_dimensions: Option<Option<(usize, usize)>>,
    rewrite_clamped_gt: Option<bool>,
    fail_fast: Option<bool>,
}

impl PipelineConfigBuilder {
    pub fn invalid_fill(mut self, fill: f32) -> Self {
        self.invalid_fill = Some(fill);
        self
    }

    pub fn treat_non_positive_as_invalid(mut self, enable: bool) -> Self {
        self.treat_non_positive_as_invalid = Some(enable);
        self
    }

    pub fn invalid_color(mut self, color: Option<[u8; 3]>) -> Self {
        self.invalid_color = Some(color);
        self
    }

    pub fn noise_viz_invalid_color(mut self, color: Option<[u8; 3]>) -> Self {
        self.noise_viz_invalid_color = Some(color);
        self
    }

    pub fn tiff_compression(mut self, compression: TiffCompression) -> Self {
        self.tiff_compression = Some(compression);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn expected_dimensions(mut self, dims: Option<(usize, usize)>) -> Self {
        self.expected_dimensions = Some(dims);
        self
    }

    pub fn rewrite_clamped_gt(mut self, enable: bool) -> Self {
        self.rewrite_clamped_gt = Some(enable);
        self
    }

    pub fn fail_fast(mut self, enable: bool) -> Self {
        self.fail_fast = Some(enable);
        self
    }

    pub fn build(self) -> PipelineConfig {
        let default = PipelineConfig::default();
        PipelineConfig {
            invalid_fill: self.invalid_fill.unwrap_or(default.invalid_fill),
            treat_non_positive_as_invalid: self
                .treat_non_positive_as_invalid
                .unwrap_or(default.treat_non_positive_as_invalid),
            invalid_color: self.invalid_color.unwrap_or(default.invalid_color),
            noise_viz_invalid_color: self
                .noise_viz_invalid_color
                .unwrap_or(default.noise_viz_invalid_color),
            tiff_compression: self.tiff_compression.unwrap_or(default.tiff_compression),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            expected_dimensions: self.expected_dimensions.unwrap_or(default.expected_dimensions),
            rewrite_clamped_gt: self.rewrite_clamped_gt.unwrap_or(default.rewrite_clamped_gt),
            fail_fast: self.fail_fast.unwrap_or(default.fail_fast),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::builder()
            .tiff_compression(TiffCompression::Lzw)
            .invalid_color(None)
            .validate_dimensions(false)
            .expected_dimensions(Some((640, 480)))
            .fail_fast(false)
            .build();

        assert_eq!(config.tiff_compression, TiffCompression::Lzw);
        assert_eq!(config.invalid_color, None);
        assert!(!config.validate_dimensions);
        assert_eq!(config.expected_dimensions, Some((640, 480)));
        assert!(!config.fail_fast);
        assert_eq!(config.invalid_fill, 0.0);
        assert!(config.rewrite_clamped_gt);
    }

    #[test]
    fn test_builder_defaults_match_default() {
        assert_eq!(PipelineConfig::builder().build(), PipelineConfig::default());
    }
}
