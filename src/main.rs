use std::env;
use std::path::PathBuf;

use anyhow::{Context, bail};
use rgbd_synth_rs::depth_pipeline::{BatchReport, DepthPostprocessPipeline, Manifest, SceneConfig};
use rgbd_synth_rs::logger;

use tracing::{error, info, warn};

const USAGE: &str = "Usage: rgbd_synth_rs [noise|viz] --config <scene.toml>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Batch {
    Noise,
    Viz,
}

struct Args {
    batch: Batch,
    config_path: PathBuf,
}

fn check_args(args: &[String]) -> anyhow::Result<Args> {
    if let [_, batch, flag, config_path] = args {
        let batch = match batch.as_str() {
            "noise" => Batch::Noise,
            "viz" => Batch::Viz,
            other => bail!("Unknown batch '{}'\n{}", other, USAGE),
        };
        if flag != "--config" {
            bail!("Expected --config, got '{}'\n{}", flag, USAGE);
        }
        Ok(Args {
            batch,
            config_path: PathBuf::from(config_path),
        })
    } else {
        bail!("Wrong number of arguments\n{}", USAGE)
    }
}

fn run(args: &Args) -> anyhow::Result<BatchReport> {
    let scene = SceneConfig::load(&args.config_path)
        .with_context(|| format!("loading scene config {}", args.config_path.display()))?;
    let manifest_path = scene.manifest_path();
    let manifest = Manifest::load(&manifest_path)
        .with_context(|| format!("reading manifest {}", manifest_path.display()))?;

    let pipeline = DepthPostprocessPipeline::new(scene.pipeline.clone());
    info!(
        scene = %scene.render.scene_id,
        zmax = scene.render.zmax_m,
        compression = ?pipeline.config().tiff_compression,
        fail_fast = pipeline.config().fail_fast,
        "Depth post-processing pipeline initialized"
    );

    let report = match args.batch {
        Batch::Noise => pipeline.run_noise_batch(&scene, &manifest),
        Batch::Viz => pipeline.run_viz_batch(&scene, &manifest),
    }
    .with_context(|| format!("{:?} batch failed", args.batch))?;
    Ok(report)
}

fn main() -> anyhow::Result<()> {
    logger::init(logger::DEFAULT_DIRECTIVE);

    let args: Vec<String> = env::args().collect();
    let args = check_args(&args)?;
    info!(config = %args.config_path.display(), batch = ?args.batch, "Starting");

    let report = run(&args).inspect_err(|e| error!("{:#}", e))?;
    for failure in &report.failures {
        warn!("{}", failure);
    }
    if !report.is_success() {
        bail!(
            "{} of {} frames failed",
            report.summary.frames_failed,
            report.summary.frames_total
        );
    }
    Ok(())
}
