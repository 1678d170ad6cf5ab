//! pointstorm configuration
//!
//! Loaded from a TOML file; every field has a default so an empty file (or no
//! file at all) reproduces the stock hundred-million point ring.
//!
//! ```toml
//! [points]
//! count = 100000000
//! mean = 0.5
//! std_dev = 0.08
//!
//! [render]
//! radius = 0.01
//! polygon_order = 8
//! fill_alpha = 0.05
//!
//! [window]
//! width = 1024
//! height = 768
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::FanTemplate;
use crate::sampler::{PointSampler, SamplerConfig, DEFAULT_SEED};

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointstormConfig {
    pub points: PointsConfig,
    pub render: RenderConfig,
    pub window: WindowConfig,
}

/// Point cloud generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointsConfig {
    /// Number of points to generate
    pub count: usize,
    /// Mean of the radius distribution
    pub mean: f64,
    /// Standard deviation of the radius distribution
    pub std_dev: f64,
    /// RNG seed
    pub seed: u64,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            count: 100_000_000,
            mean: 0.5,
            std_dev: 0.08,
            seed: DEFAULT_SEED,
        }
    }
}

impl PointsConfig {
    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            mean: self.mean,
            std_dev: self.std_dev,
            seed: self.seed,
        }
    }
}

/// Circle expansion and compositing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Circle radius in normalized device coordinates
    pub radius: f32,
    /// Sides of the circle approximation
    pub polygon_order: u32,
    /// Framebuffer clear colour (rgba)
    pub clear_color: [f64; 4],
    /// Circle fill colour (rgb)
    pub fill_color: [f32; 3],
    /// Circle fill opacity
    pub fill_alpha: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            radius: 0.01,
            polygon_order: 8,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            fill_color: [1.0, 0.0, 0.0],
            fill_alpha: 0.05,
        }
    }
}

impl RenderConfig {
    /// Fill colour with alpha appended
    pub fn fill_rgba(&self) -> [f32; 4] {
        let [r, g, b] = self.fill_color;
        [r, g, b, self.fill_alpha]
    }

    pub fn fan(&self) -> Result<FanTemplate, ConfigError> {
        FanTemplate::new(self.polygon_order)
    }
}

/// Window settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial width in logical pixels
    pub width: u32,
    /// Initial height in logical pixels
    pub height: u32,
    /// Wait for vertical blank before presenting
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "One Hundred Million Points".to_string(),
            width: 1024,
            height: 768,
            vsync: true,
        }
    }
}

impl PointstormConfig {
    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field that would otherwise fail later during sampling or
    /// rendering
    pub fn validate(&self) -> Result<(), ConfigError> {
        PointSampler::new(self.points.sampler_config()).map_err(|e| {
            ConfigError::InvalidValue {
                field: "points",
                reason: e.to_string(),
            }
        })?;

        self.render.fan()?;

        if !self.render.radius.is_finite() || self.render.radius < 0.0 {
            return Err(invalid("render.radius", "must be finite and non-negative"));
        }
        if !(0.0..=1.0).contains(&self.render.fill_alpha) {
            return Err(invalid("render.fill_alpha", "must be between 0 and 1"));
        }
        if !self.render.fill_color.iter().all(|c| c.is_finite()) {
            return Err(invalid("render.fill_color", "must be finite"));
        }
        if !self.render.clear_color.iter().all(|c| c.is_finite()) {
            return Err(invalid("render.clear_color", "must be finite"));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(invalid("window", "width and height must be non-zero"));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = PointstormConfig::from_toml_str("").unwrap();
        assert_eq!(config, PointstormConfig::default());
        assert_eq!(config.points.count, 100_000_000);
        assert_eq!(config.render.polygon_order, 8);
        assert_eq!(config.render.fill_rgba(), [1.0, 0.0, 0.0, 0.05]);
        assert_eq!((config.window.width, config.window.height), (1024, 768));
    }

    #[test]
    fn test_partial_override() {
        let config = PointstormConfig::from_toml_str(
            r#"
            [points]
            count = 5000
            seed = 9

            [render]
            polygon_order = 16
            fill_color = [0.2, 0.4, 1.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.points.count, 5000);
        assert_eq!(config.points.seed, 9);
        assert_eq!(config.points.mean, 0.5);
        assert_eq!(config.render.polygon_order, 16);
        assert_eq!(config.render.fill_color, [0.2, 0.4, 1.0]);
        assert_eq!(config.render.radius, 0.01);
    }

    #[test]
    fn test_rejects_order_over_budget() {
        let err = PointstormConfig::from_toml_str("[render]\npolygon_order = 100\n").unwrap_err();
        assert!(matches!(err, ConfigError::PolygonOrder { order: 100, .. }));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(PointstormConfig::from_toml_str("[render]\nfill_alpha = 1.5\n").is_err());
        assert!(PointstormConfig::from_toml_str("[render]\nradius = -0.1\n").is_err());
        assert!(PointstormConfig::from_toml_str("[points]\nstd_dev = -0.1\n").is_err());
        assert!(PointstormConfig::from_toml_str("[window]\nwidth = 0\n").is_err());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = PointstormConfig::from_toml_str("[points\ncount = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = PointstormConfig::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(PointstormConfig::from_toml_str(&text).unwrap(), config);
    }
}
