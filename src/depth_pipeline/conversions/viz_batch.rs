use tracing::{info, instrument};

use crate::depth_pipeline::{
    common::{FrameTimings, Result},
    config::scene::SceneConfig,
    conversions::{pipeline::DepthPostprocessPipeline, report::BatchReport},
    depth::{DepthReader, DepthWriter},
    manifest::{Manifest, VizJob, VizTarget},
    viz::{VizEncoding, VizWriter},
};

impl<R: DepthReader, W: DepthWriter, V: VizWriter> DepthPostprocessPipeline<R, W, V> {
    /// Reads `target.depth`, clamps it to `zmax` and writes the preview to `target.viz`.
    pub(crate) fn preview_from_file(
        &self,
        target: &VizTarget,
        zmax: f32,
        encoding: VizEncoding,
        timings: &mut FrameTimings,
    ) -> Result<()> {
        info!(
            depth = %target.depth.display(),
            viz = %target.viz.display(),
            zmax,
            "Depth -> preview"
        );
        let frame = timings.time("read", || self.read_depth_file(&target.depth))?;
        let frame = timings.time("clamp", || self.clamp_ground_truth(frame, zmax));
        timings.time("viz", || self.write_viz_file(&frame, zmax, encoding, &target.viz))
    }

    #[instrument(skip_all, fields(frame = %job.frame, zmax = job.zmax))]
    pub fn process_viz_frame(&self, job: &VizJob) -> Result<FrameTimings> {
        let mut timings = FrameTimings::new();
        let encoding = self.viz_encoding();
        self.preview_from_file(&job.gt, job.zmax, encoding, &mut timings)?;
        if let Some(noisy) = &job.noisy {
            self.preview_from_file(noisy, job.zmax, encoding, &mut timings)?;
        }
        Ok(timings)
    }

    /// Visualization batch over every manifest row.
    pub fn run_viz_batch(&self, scene: &SceneConfig, manifest: &Manifest) -> Result<BatchReport> {
        let scene_root = scene.scene_root();
        let fail_fast = self.config().fail_fast;
        let mut report = BatchReport::new("viz", scene.render.scene_id.as_str());
        info!(
            scene = %scene.render.scene_id,
            rows = manifest.len(),
            encoding = ?self.viz_encoding(),
            "Starting visualization batch"
        );

        for (index, row) in manifest.iter().enumerate() {
            let frame = row.frame_id(index);
            let outcome = row
                .viz_job(index, &scene_root, scene.render.zmax_m)
                .and_then(|job| self.process_viz_frame(&job))
                .map_err(|e| e.in_frame(frame));
            report.record(outcome, fail_fast)?;
        }

        report.summary.log();
        Ok(report)
    }
}
