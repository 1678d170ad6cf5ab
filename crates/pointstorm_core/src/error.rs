//! Error types for pointstorm_core

use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Polygon order outside the supported range
    #[error("Polygon order {order} out of range: must be between {min} and {max}")]
    PolygonOrder { order: u32, min: u32, max: u32 },

    /// A field holds a value that cannot be rendered or sampled
    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

/// Errors raised by the point sampler
#[derive(Error, Debug)]
pub enum SamplerError {
    /// Normal distribution parameters were rejected
    #[error("Invalid radial distribution (mean {mean}, std dev {std_dev}): {reason}")]
    Distribution {
        mean: f64,
        std_dev: f64,
        reason: String,
    },

    /// The point buffer could not be allocated
    #[error("Failed to allocate {count} points: {reason}")]
    Allocation { count: usize, reason: String },
}
