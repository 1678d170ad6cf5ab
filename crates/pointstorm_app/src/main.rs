//! pointstorm
//!
//! Samples a large 2D point cloud on a noisy ring and renders it as a
//! rotating field of translucent circles.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pointstorm_core::PointstormConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod context;
mod fps;
mod progress;
mod windowed;

#[derive(Parser, Debug)]
#[command(name = "pointstorm")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Render a hundred million points as blended circles", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of points to generate
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Seed for the point sampler
    #[arg(short, long)]
    seed: Option<u64>,

    /// Circle radius in normalized device units
    #[arg(short, long)]
    radius: Option<f32>,

    /// Number of polygon segments per circle
    #[arg(short, long)]
    order: Option<u32>,

    /// Present without waiting for vertical sync
    #[arg(long)]
    no_vsync: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Overlay command line flags onto a loaded configuration
    fn apply(&self, config: &mut PointstormConfig) {
        if let Some(count) = self.count {
            config.points.count = count;
        }
        if let Some(seed) = self.seed {
            config.points.seed = seed;
        }
        if let Some(radius) = self.radius {
            config.render.radius = radius;
        }
        if let Some(order) = self.order {
            config.render.polygon_order = order;
        }
        if self.no_vsync {
            config.window.vsync = false;
        }
    }

    fn load_config(&self) -> Result<PointstormConfig> {
        let mut config = match &self.config {
            Some(path) => PointstormConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => PointstormConfig::default(),
        };
        self.apply(&mut config);
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.load_config()?;
    let points = progress::generate_points(&config.points)?;

    windowed::run(config, points)
}
