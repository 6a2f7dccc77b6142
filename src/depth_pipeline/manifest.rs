//! Renderer manifest (`manifest.csv`).
//!
//! One row per rendered frame. Paths are relative to the scene root. The
//! batches only consume the depth and preview columns; the pose and mask
//! columns are parsed but unused here.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::depth_pipeline::common::error::{DepthError, Result};
use crate::depth_pipeline::validity::validate_zmax;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ManifestRow {
    pub frame: Option<String>,
    pub rgb: Option<String>,
    pub depth_exr_gt: Option<String>,
    pub depth_exr: Option<String>,
    pub depth_exr_noisy: Option<String>,
    pub depth_viz: Option<String>,
    pub depth_viz_gt: Option<String>,
    pub depth_viz_noisy: Option<String>,
    pub mask: Option<String>,
    #[serde(rename = "T_WC_txt")]
    pub t_wc_txt: Option<String>,
    #[serde(rename = "T_WD_txt")]
    pub t_wd_txt: Option<String>,
    #[serde(rename = "T_WO_txt")]
    pub t_wo_txt: Option<String>,
    #[serde(rename = "p_WC")]
    pub p_wc: Option<String>,
    #[serde(rename = "p_W_target")]
    pub p_w_target: Option<String>,
    pub zmax: Option<String>,
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn missing(column: &str) -> DepthError {
    DepthError::ConfigError(format!("manifest row is missing '{column}'"))
}

fn require<'a>(field: &'a Option<String>, column: &str) -> Result<&'a str> {
    non_empty(field).ok_or_else(|| missing(column))
}

/// Everything the noise batch needs for one frame, with absolute paths.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseJob {
    pub frame: String,
    pub depth_gt: PathBuf,
    pub depth_noisy: PathBuf,
    pub viz_gt: PathBuf,
    pub viz_noisy: PathBuf,
    pub zmax: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VizTarget {
    pub depth: PathBuf,
    pub viz: PathBuf,
}

/// Ground-truth preview plus, when the row has both noisy columns, the noisy one.
#[derive(Debug, Clone, PartialEq)]
pub struct VizJob {
    pub frame: String,
    pub gt: VizTarget,
    pub noisy: Option<VizTarget>,
    pub zmax: f32,
}

impl ManifestRow {
    /// Frame identifier used in logs and errors; falls back to the row index.
    pub fn frame_id(&self, index: usize) -> String {
        non_empty(&self.frame)
            .map(str::to_string)
            .unwrap_or_else(|| format!("row {index}"))
    }

    /// The row's `zmax` column, or `default` when it is absent or empty.
    pub fn zmax_or(&self, default: f32) -> Result<f32> {
        let zmax = match non_empty(&self.zmax) {
            Some(text) => text.parse::<f32>().map_err(|e| {
                DepthError::InvalidValue(format!("zmax '{text}' is not a number: {e}"))
            })?,
            None => default,
        };
        validate_zmax(zmax)
    }

    /// GT depth column; `depth_exr` is the older name.
    pub fn depth_gt(&self) -> Option<&str> {
        non_empty(&self.depth_exr_gt).or_else(|| non_empty(&self.depth_exr))
    }

    /// GT preview column; `depth_viz` is the older name.
    pub fn viz_gt(&self) -> Option<&str> {
        non_empty(&self.depth_viz_gt).or_else(|| non_empty(&self.depth_viz))
    }

    pub fn noise_job(&self, index: usize, scene_root: &Path, default_zmax: f32) -> Result<NoiseJob> {
        Ok(NoiseJob {
            frame: self.frame_id(index),
            depth_gt: scene_root.join(self.depth_gt().ok_or_else(|| missing("depth_exr_gt"))?),
            depth_noisy: scene_root.join(require(&self.depth_exr_noisy, "depth_exr_noisy")?),
            viz_gt: scene_root.join(self.viz_gt().ok_or_else(|| missing("depth_viz_gt"))?),
            viz_noisy: scene_root.join(require(&self.depth_viz_noisy, "depth_viz_noisy")?),
            zmax: self.zmax_or(default_zmax)?,
        })
    }

    pub fn viz_job(&self, index: usize, scene_root: &Path, default_zmax: f32) -> Result<VizJob> {
        let depth = self.depth_gt().ok_or_else(|| missing("depth_exr_gt"))?;
        let viz = self.viz_gt().ok_or_else(|| missing("depth_viz_gt"))?;
        let noisy = match (non_empty(&self.depth_exr_noisy), non_empty(&self.depth_viz_noisy)) {
            (Some(depth), Some(viz)) => Some(VizTarget {
                depth: scene_root.join(depth),
                viz: scene_root.join(viz),
            }),
            _ => None,
        };
        Ok(VizJob {
            frame: self.frame_id(index),
            gt: VizTarget {
                depth: scene_root.join(depth),
                viz: scene_root.join(viz),
            },
            noisy,
            zmax: self.zmax_or(default_zmax)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    pub rows: Vec<ManifestRow>,
}

impl Manifest {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
        let mut rows = Vec::new();
        for (index, record) in csv_reader.deserialize::<ManifestRow>().enumerate() {
            let row = record.map_err(|e| {
                DepthError::ConfigError(format!("manifest row {index}: {e}"))
            })?;
            rows.push(row);
        }
        Ok(Self { rows })
    }

    /// Reads a manifest file. A missing file is an IO error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            DepthError::InputReadError(format!("manifest not found: {}: {}", path.display(), e))
        })?;
        let manifest = Self::from_reader(file).map_err(|e| match e {
            DepthError::ConfigError(msg) => {
                DepthError::ConfigError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;
        debug!(manifest = %path.display(), rows = manifest.len(), "Loaded manifest");
        Ok(manifest)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestRow> {
        self.rows.iter()
    }
}
