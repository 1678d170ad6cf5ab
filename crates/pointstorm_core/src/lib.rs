//! pointstorm core
//!
//! Host-side half of the point cloud renderer: everything that does not need
//! a GPU.
//!
//! - **Sampler**: draws a ring-shaped cloud of 2D points from a normal radius
//!   law and a uniform angle
//! - **Transform**: the rotation + orthographic projection supplied once per
//!   frame
//! - **Geometry**: the circle fan template each point expands into
//! - **Config**: TOML configuration with validation

pub mod config;
pub mod error;
pub mod geometry;
pub mod point;
pub mod resolution;
pub mod sampler;
pub mod transform;

pub use config::{PointsConfig, PointstormConfig, RenderConfig, WindowConfig};
pub use error::{ConfigError, SamplerError};
pub use geometry::{FanTemplate, MAX_FAN_VERTICES, MAX_POLYGON_ORDER, MIN_POLYGON_ORDER};
pub use point::{Point, PointBuffer};
pub use resolution::Resolution;
pub use sampler::{PointSampler, SamplerConfig, DEFAULT_SEED, PROGRESS_INTERVAL};
pub use transform::{frame_transform, Mat4};
