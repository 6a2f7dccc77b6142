use std::io::Write;
use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::{info, instrument, warn};

use crate::depth_pipeline::{
    common::error::{DepthError, Result},
    config::types::PipelineConfig,
    depth::{DepthFormat, DepthFrame, DepthReader, DepthWriter, StandardDepthCodec},
    noise::NoiseChain,
    validity::ValidityPolicy,
    viz::{DisplayImage, ImageVizWriter, PreviewFormat, VizEncoding, VizWriter, Visualizer},
};

/// Reads, perturbs, clamps and previews depth files.
///
/// The codecs are pluggable so the batches can be driven by in-memory mocks.
pub struct DepthPostprocessPipeline<R: DepthReader, W: DepthWriter, V: VizWriter> {
    reader: R,
    writer: W,
    viz_writer: V,
    config: PipelineConfig,
}

impl DepthPostprocessPipeline<StandardDepthCodec, StandardDepthCodec, ImageVizWriter> {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            reader: StandardDepthCodec,
            writer: StandardDepthCodec,
            viz_writer: ImageVizWriter,
            config,
        }
    }
}

impl<R: DepthReader, W: DepthWriter, V: VizWriter> DepthPostprocessPipeline<R, W, V> {
    pub fn with_custom(reader: R, writer: W, viz_writer: V, config: PipelineConfig) -> Self {
        Self {
            reader,
            writer,
            viz_writer,
            config,
        }
    }

    fn validate_dimensions(&self, frame: &DepthFrame) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if frame.width == 0 || frame.height == 0 {
            return Err(DepthError::InvalidDimensions(frame.width, frame.height));
        }

        if let Some((width, height)) = self.config.expected_dimensions {
            if frame.width != width || frame.height != height {
                warn!(
                    "Depth dimensions {}x{} differ from render resolution {}x{}",
                    frame.width, frame.height, width, height
                );
                return Err(DepthError::InvalidDimensions(frame.width, frame.height));
            }
        }

        Ok(())
    }

    /// Validity rules for a frame with sensing range `zmax`.
    pub fn policy(&self, zmax: f32) -> ValidityPolicy {
        ValidityPolicy::new(zmax)
            .with_invalid_fill(self.config.invalid_fill)
            .with_non_positive_invalid(self.config.treat_non_positive_as_invalid)
    }

    /// Preview encoding of the visualization batch.
    pub fn viz_encoding(&self) -> VizEncoding {
        VizEncoding::from_invalid_color(self.config.invalid_color)
    }

    /// Preview encoding of the noise batch.
    pub fn noise_viz_encoding(&self) -> VizEncoding {
        VizEncoding::from_invalid_color(self.config.noise_viz_invalid_color)
    }

    pub fn decode_depth(&self, input_data: &[u8]) -> Result<DepthFrame> {
        let frame = {
            let _span = tracing::info_span!("decode_depth").entered();
            self.reader.read_depth(input_data)?
        };

        {
            let _span = tracing::info_span!(
                "validate_dimensions",
                width = frame.width,
                height = frame.height
            )
            .entered();
            self.validate_dimensions(&frame)?;
        }

        Ok(frame)
    }

    /// Decodes `input_data`, runs `chain` and encodes the noisy frame into `output`.
    #[instrument(skip_all, fields(input_size = input_data.len(), chain = %chain))]
    pub fn process_noise<G: Rng>(
        &self,
        input_data: &[u8],
        chain: &NoiseChain,
        zmax: f32,
        format: DepthFormat,
        output: &mut dyn Write,
        rng: &mut G,
    ) -> Result<DepthFrame> {
        let frame = self.decode_depth(input_data)?;
        let noisy = self.apply_noise(chain, frame, zmax, rng)?;

        {
            let _span = tracing::info_span!("encode_depth").entered();
            self.writer.write_depth(&noisy, format, output, &self.config)?;
        }

        info!(width = noisy.width, height = noisy.height, "Noise applied");
        Ok(noisy)
    }

    pub fn apply_noise<G: Rng>(
        &self,
        chain: &NoiseChain,
        frame: DepthFrame,
        zmax: f32,
        rng: &mut G,
    ) -> Result<DepthFrame> {
        let _span = tracing::info_span!("noise_chain", operators = chain.len()).entered();
        chain.run(frame, &self.policy(zmax), rng)
    }

    /// Zeroes ground truth beyond `zmax`. A zero `zmax` leaves the frame as is.
    pub fn clamp_ground_truth(&self, frame: DepthFrame, zmax: f32) -> DepthFrame {
        if zmax > 0.0 {
            self.policy(zmax).clamp_to_zmax(frame)
        } else {
            frame
        }
    }

    pub fn render_preview(
        &self,
        frame: &DepthFrame,
        zmax: f32,
        encoding: VizEncoding,
    ) -> Result<DisplayImage> {
        let _span = tracing::info_span!("render_preview").entered();
        Visualizer::new(encoding).to_display(frame, zmax)
    }

    #[instrument(skip(self))]
    pub fn read_depth_file(&self, path: &Path) -> Result<DepthFrame> {
        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(path)
                .map_err(|e| DepthError::InputReadError(format!("{}: {}", path.display(), e)))?
        };
        self.decode_depth(&input_data)
    }

    /// Encodes `frame` in the container named by the path extension.
    #[instrument(skip(self, frame))]
    pub fn write_depth_file(&self, frame: &DepthFrame, path: &Path) -> Result<()> {
        let format = DepthFormat::from_path(path)?;
        let mut buffer = Vec::new();
        {
            let _span = tracing::info_span!("encode_depth").entered();
            self.writer.write_depth(frame, format, &mut buffer, &self.config)?;
        }
        write_output_file(path, &buffer)
    }

    #[instrument(skip(self, frame, encoding))]
    pub fn write_viz_file(
        &self,
        frame: &DepthFrame,
        zmax: f32,
        encoding: VizEncoding,
        path: &Path,
    ) -> Result<()> {
        let format = PreviewFormat::from_path(path)?;
        let image = self.render_preview(frame, zmax, encoding)?;
        let mut buffer = Vec::new();
        {
            let _span = tracing::info_span!("encode_preview").entered();
            self.viz_writer.write_viz(&image, format, &mut buffer)?;
        }
        write_output_file(path, &buffer)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: PipelineConfig) {
        self.config = config;
    }
}

/// Sibling of `path` the encoded bytes are staged in before the rename.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Writes `buffer` to a staging file and renames it over `path`, so an
/// existing destination survives a failed write.
fn write_output_file(path: &Path, buffer: &[u8]) -> Result<()> {
    let _span = tracing::info_span!("write_output_file", bytes = buffer.len()).entered();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| DepthError::OutputWriteError(format!("{}: {}", parent.display(), e)))?;
    }

    let staging = staging_path(path);
    let staged = std::fs::File::create(&staging)
        .and_then(|mut file| {
            file.write_all(buffer)?;
            file.sync_all()
        })
        .and_then(|_| std::fs::rename(&staging, path));
    if let Err(e) = staged {
        let _ = std::fs::remove_file(&staging);
        return Err(DepthError::OutputWriteError(format!("{}: {}", path.display(), e)));
    }
    Ok(())
}
