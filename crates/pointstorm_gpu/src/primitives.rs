//! GPU data layouts

use bytemuck::{Pod, Zeroable};
use pointstorm_core::{FanTemplate, Mat4, Resolution};

/// Per-frame uniforms for the expansion pipeline
/// Must match the WGSL `ExpansionUniforms` layout exactly
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ExpansionUniforms {
    /// Projection × rotation (column-major)
    pub mvp: [[f32; 4]; 4],
    /// Viewport size in pixels (width, height)
    pub resolution: [f32; 2],
    /// Circle radius in NDC
    pub radius: f32,
    /// Polygon order
    pub order: u32,
    /// Fill colour (rgba, non-premultiplied)
    pub fill_color: [f32; 4],
}

impl ExpansionUniforms {
    pub fn new(
        mvp: Mat4,
        resolution: Resolution,
        radius: f32,
        fan: FanTemplate,
        fill_color: [f32; 4],
    ) -> Self {
        Self {
            mvp,
            resolution: resolution.as_array(),
            radius,
            order: fan.order(),
            fill_color,
        }
    }
}

impl Default for ExpansionUniforms {
    fn default() -> Self {
        Self {
            mvp: pointstorm_core::transform::IDENTITY,
            resolution: [1024.0, 768.0],
            radius: 0.01,
            order: 8,
            fill_color: [1.0, 0.0, 0.0, 0.05],
        }
    }
}

/// Vertex layout of the uploaded points: one `vec2<f32>` per instance
pub fn point_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<pointstorm_core::Point>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &ATTRIBUTES,
    }
}
