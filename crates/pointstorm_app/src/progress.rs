//! Point generation with a terminal progress bar

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use pointstorm_core::{PointBuffer, PointSampler, PointsConfig};

/// Generate the configured point cloud, showing progress on stderr
pub fn generate_points(config: &PointsConfig) -> Result<PointBuffer> {
    let sampler = PointSampler::new(config.sampler_config())?;

    tracing::info!(
        "Generating {} points (mean {}, std dev {}, seed {})",
        config.count,
        config.mean,
        config.std_dev,
        config.seed
    );

    let pb = ProgressBar::new(config.count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.red/white}] {pos}/{len} points ({percent}%) {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("▉▊▋▌▍▎▏ "),
    );
    pb.set_message("Generating points");

    let points = sampler
        .generate_with_progress(config.count, &mut |n| pb.set_position(n as u64))
        .context("Point generation failed")?;

    pb.finish_and_clear();
    tracing::info!("Done generating {} points", points.len());

    Ok(points)
}
