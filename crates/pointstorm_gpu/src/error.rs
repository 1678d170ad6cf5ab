//! Error types for pointstorm_gpu

use std::fmt;

use thiserror::Error;

/// Shader stages of the expansion pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Uniform block and per-point transform
    Vertex,
    /// Point-to-fan expansion entry point
    Geometry,
    /// Translucent fill
    Fragment,
}

impl ShaderStage {
    pub fn name(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while building the expansion pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A stage failed to parse or validate
    #[error("{stage} shader failed to compile: {diagnostic}")]
    Compile {
        stage: ShaderStage,
        diagnostic: String,
    },

    /// Stages compiled but do not form a usable program
    #[error("Shader program failed to link: {0}")]
    Link(String),
}

impl PipelineError {
    /// Stage that failed, if the failure belongs to a single stage
    pub fn stage(&self) -> Option<ShaderStage> {
        match self {
            PipelineError::Compile { stage, .. } => Some(*stage),
            PipelineError::Link(_) => None,
        }
    }
}

/// Errors raised while acquiring GPU resources
#[derive(Error, Debug)]
pub enum GpuError {
    /// No adapter matched the request
    #[error("No suitable GPU adapter found")]
    AdapterNotFound,

    /// Failed to request a device
    #[error("Failed to request GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    /// Failed to create a surface
    #[error("Failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    /// The surface cannot be presented by the chosen adapter
    #[error("Surface is not supported by the adapter")]
    SurfaceUnsupported,

    /// The point buffer could not be placed in GPU memory
    #[error("Failed to upload {count} points: {reason}")]
    Upload { count: usize, reason: String },

    /// Pipeline construction failed
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Render settings were rejected
    #[error(transparent)]
    Config(#[from] pointstorm_core::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_error_names_the_step() {
        let err = GpuError::Upload {
            count: 100_000_000,
            reason: "Out of Memory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to upload 100000000 points: Out of Memory"
        );
    }

    #[test]
    fn test_compile_error_names_the_stage() {
        let err = PipelineError::Compile {
            stage: ShaderStage::Geometry,
            diagnostic: "expected expression".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "geometry shader failed to compile: expected expression"
        );
        assert_eq!(err.stage(), Some(ShaderStage::Geometry));
    }
}
