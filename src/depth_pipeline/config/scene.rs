//! Scene configuration file.
//!
//! The scene TOML is shared with the renderer. Only the `[render]`, `[noise]`
//! and `[pipeline]` tables are read here; renderer tables such as `[rig]`,
//! `[obj]` and `[seq]` are ignored.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::depth_pipeline::common::error::{DepthError, Result};
use crate::depth_pipeline::config::types::PipelineConfig;
use crate::depth_pipeline::noise::config::NoiseConfig;
use crate::depth_pipeline::validity::validate_zmax;

pub const MANIFEST_FILE: &str = "manifest.csv";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RenderConfig {
    /// Base output directory of the renderer
    pub out_dir: PathBuf,
    /// Scene directory name under `out_dir`
    pub scene_id: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Maximum sensing range in metres; 0 disables the range clamp
    #[serde(default)]
    pub zmax_m: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SceneConfig {
    pub render: RenderConfig,
    #[serde(default)]
    pub noise: NoiseConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl SceneConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut config: SceneConfig =
            toml::from_str(text).map_err(|e| DepthError::ConfigError(e.to_string()))?;
        if let (Some(w), Some(h)) = (config.render.width, config.render.height) {
            config.pipeline.expected_dimensions = Some((w as usize, h as usize));
        }
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DepthError::InputReadError(format!("{}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text).map_err(|e| match e {
            DepthError::ConfigError(msg) => {
                DepthError::ConfigError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;
        info!(config = %path.display(), scene = %config.render.scene_id, "Loaded scene config");
        debug!(?config, "Scene config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.render.scene_id.trim().is_empty() {
            return Err(DepthError::ConfigError("render.scene_id must not be empty".to_string()));
        }
        validate_zmax(self.render.zmax_m)?;
        self.noise.validate()
    }

    /// `out_dir / scene_id`, where the renderer leaves the manifest.
    pub fn scene_root(&self) -> PathBuf {
        self.render.out_dir.join(&self.render.scene_id)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.scene_root().join(MANIFEST_FILE)
    }
}
