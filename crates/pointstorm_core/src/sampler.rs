//! Radial point sampler
//!
//! Produces points whose radius follows a normal law and whose angle is
//! uniform over `[0, 2π)`. The radius is used as drawn, sign included, so the
//! cloud forms a soft ring rather than a filled disk.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal, Uniform};
use serde::{Deserialize, Serialize};

use crate::error::SamplerError;
use crate::point::{Point, PointBuffer};

/// Seed used when none is configured, so default runs are reproducible
pub const DEFAULT_SEED: u64 = 1;

/// Number of points between progress reports
pub const PROGRESS_INTERVAL: usize = 1 << 20;

/// Radial distribution parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Mean of the radius distribution
    pub mean: f64,
    /// Standard deviation of the radius distribution
    pub std_dev: f64,
    /// RNG seed
    pub seed: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            mean: 0.5,
            std_dev: 0.08,
            seed: DEFAULT_SEED,
        }
    }
}

/// Generates point buffers from a [`SamplerConfig`]
#[derive(Clone, Debug)]
pub struct PointSampler {
    config: SamplerConfig,
    radius: Normal<f64>,
    angle: Uniform<f64>,
}

impl PointSampler {
    pub fn new(config: SamplerConfig) -> Result<Self, SamplerError> {
        let invalid = |reason: String| SamplerError::Distribution {
            mean: config.mean,
            std_dev: config.std_dev,
            reason,
        };

        if !config.mean.is_finite() {
            return Err(invalid("mean must be finite".to_string()));
        }
        if !config.std_dev.is_finite() {
            return Err(invalid("std dev must be finite".to_string()));
        }
        if config.std_dev < 0.0 {
            return Err(invalid("std dev must be non-negative".to_string()));
        }
        let radius = Normal::new(config.mean, config.std_dev).map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            config,
            radius,
            angle: Uniform::new(0.0, TAU),
        })
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Generate `count` points
    pub fn generate(&self, count: usize) -> Result<PointBuffer, SamplerError> {
        self.generate_with_progress(count, &mut |_| {})
    }

    /// Generate `count` points, reporting the running total every
    /// [`PROGRESS_INTERVAL`] points and once at the end
    pub fn generate_with_progress(
        &self,
        count: usize,
        progress: &mut dyn FnMut(usize),
    ) -> Result<PointBuffer, SamplerError> {
        let mut points = Vec::new();
        points
            .try_reserve_exact(count)
            .map_err(|e| SamplerError::Allocation {
                count,
                reason: e.to_string(),
            })?;

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        for i in 0..count {
            if i > 0 && i % PROGRESS_INTERVAL == 0 {
                progress(i);
            }
            let r = self.radius.sample(&mut rng);
            let theta = self.angle.sample(&mut rng);
            points.push(point_from_polar(r, theta));
        }
        progress(count);

        tracing::debug!(count, seed = self.config.seed, "Generated point buffer");
        Ok(PointBuffer::from(points))
    }
}

/// Polar to Cartesian without folding negative radii
fn point_from_polar(r: f64, theta: f64) -> Point {
    Point::new((r * theta.cos()) as f32, (r * theta.sin()) as f32)
}
