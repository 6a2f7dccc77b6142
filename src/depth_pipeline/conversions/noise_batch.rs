use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument};

use crate::depth_pipeline::{
    common::{FrameTimings, Result},
    config::scene::SceneConfig,
    conversions::{pipeline::DepthPostprocessPipeline, report::BatchReport},
    depth::{DepthFrame, DepthReader, DepthWriter},
    manifest::{Manifest, NoiseJob, VizTarget},
    noise::NoiseChain,
    viz::VizWriter,
};

/// Mean and max of `|a - b|` over pixels where the difference is finite.
pub fn abs_diff_stats(a: &DepthFrame, b: &DepthFrame) -> (f64, f64) {
    let mut sum = 0.0f64;
    let mut max = 0.0f64;
    let mut count = 0usize;
    for (&x, &y) in a.data.iter().zip(&b.data) {
        let d = (f64::from(x) - f64::from(y)).abs();
        if d.is_finite() {
            sum += d;
            max = max.max(d);
            count += 1;
        }
    }
    let mean = if count == 0 { 0.0 } else { sum / count as f64 };
    (mean, max)
}

/// Per-frame generator: `seed + index` when seeded, OS entropy otherwise.
pub fn frame_rng(seed: Option<u64>, index: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
        None => StdRng::from_os_rng(),
    }
}

impl<R: DepthReader, W: DepthWriter, V: VizWriter> DepthPostprocessPipeline<R, W, V> {
    #[instrument(skip_all, fields(frame = %job.frame, zmax = job.zmax))]
    pub fn process_noise_frame<G: Rng>(
        &self,
        job: &NoiseJob,
        chain: &NoiseChain,
        rng: &mut G,
    ) -> Result<FrameTimings> {
        let mut timings = FrameTimings::new();

        let gt = timings.time("read", || self.read_depth_file(&job.depth_gt))?;
        let gt = if job.zmax > 0.0 {
            timings.time("clamp", || -> Result<DepthFrame> {
                let clamped = self.clamp_ground_truth(gt, job.zmax);
                if self.config().rewrite_clamped_gt {
                    self.write_depth_file(&clamped, &job.depth_gt)?;
                }
                Ok(clamped)
            })?
        } else {
            gt
        };

        let noisy = timings.time("noise", || self.apply_noise(chain, gt.clone(), job.zmax, rng))?;
        let (mean, max) = abs_diff_stats(&noisy, &gt);
        debug!(diff_mean = mean, diff_max = max, "Noise magnitude");

        timings.time("write", || self.write_depth_file(&noisy, &job.depth_noisy))?;

        let encoding = self.noise_viz_encoding();
        timings.time("viz", || -> Result<()> {
            self.write_viz_file(&noisy, job.zmax, encoding, &job.viz_noisy)?;
            self.write_viz_file(&gt, job.zmax, encoding, &job.viz_gt)
        })?;

        info!(
            noisy = %job.depth_noisy.display(),
            total_ms = timings.total_duration().as_secs_f64() * 1000.0,
            "Frame done"
        );
        Ok(timings)
    }

    /// Ground-truth preview only, used when noise is disabled.
    #[instrument(skip_all, fields(frame = %frame))]
    pub fn process_gt_preview(
        &self,
        frame: &str,
        target: &VizTarget,
        zmax: f32,
    ) -> Result<FrameTimings> {
        let mut timings = FrameTimings::new();
        self.preview_from_file(target, zmax, self.noise_viz_encoding(), &mut timings)?;
        Ok(timings)
    }

    /// Noise batch over every manifest row.
    pub fn run_noise_batch(&self, scene: &SceneConfig, manifest: &Manifest) -> Result<BatchReport> {
        let scene_root = scene.scene_root();
        let fail_fast = self.config().fail_fast;
        let mut report = BatchReport::new("noise", scene.render.scene_id.as_str());

        if !scene.noise.enabled {
            info!("noise.enabled = false, rendering ground-truth previews only");
            for (index, row) in manifest.iter().enumerate() {
                let frame = row.frame_id(index);
                let outcome = row
                    .viz_job(index, &scene_root, scene.render.zmax_m)
                    .and_then(|job| self.process_gt_preview(&job.frame, &job.gt, job.zmax))
                    .map_err(|e| e.in_frame(frame));
                report.record(outcome, fail_fast)?;
            }
            report.summary.log();
            return Ok(report);
        }

        let chain = NoiseChain::from_config(&scene.noise)?;
        info!(
            scene = %scene.render.scene_id,
            rows = manifest.len(),
            chain = %chain,
            seed = ?scene.noise.seed,
            "Starting noise batch"
        );

        for (index, row) in manifest.iter().enumerate() {
            let frame = row.frame_id(index);
            let mut rng = frame_rng(scene.noise.seed, index);
            let outcome = row
                .noise_job(index, &scene_root, scene.render.zmax_m)
                .and_then(|job| self.process_noise_frame(&job, &chain, &mut rng))
                .map_err(|e| e.in_frame(frame));
            report.record(outcome, fail_fast)?;
        }

        report.summary.log();
        Ok(report)
    }
}
