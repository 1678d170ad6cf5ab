//! pointstorm GPU pipeline
//!
//! Uploads a point cloud once and expands every point into an aspect-correct,
//! alpha-blended circle fan on the GPU each frame.
//!
//! # Architecture
//!
//! ```text
//! PointBuffer ──upload once──► PointUpload (vertex buffers, instance step)
//!                                   │
//! frame_transform ─► uniforms ──────┤
//!                                   ▼
//!                    ExpansionPipeline (vertex: transform
//!                                       geometry: point → fan
//!                                       fragment: translucent fill)
//!                                   │
//!                                   ▼
//!                    source-over blending into the target
//! ```

pub mod error;
pub mod pipeline;
pub mod primitives;
pub mod renderer;
pub mod shaders;
pub mod upload;

pub use error::{GpuError, PipelineError, ShaderStage};
pub use pipeline::{compile_stage, ExpansionPipeline, ShaderProgram};
pub use primitives::ExpansionUniforms;
pub use renderer::{preferred_surface_format, ExpansionRenderer, GpuContext};
pub use shaders::{ShaderSources, FRAGMENT_ENTRY, VERTEX_ENTRY};
pub use upload::{plan_chunks, PointChunk, PointUpload};
