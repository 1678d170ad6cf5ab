//! WGSL sources for the expansion pipeline
//!
//! The program is split into three stages that are compiled separately so a
//! failure can be reported against the stage that caused it:
//! - `vertex`: uniform block consumer, transforms each point to clip space
//! - `geometry`: expands every transformed point into a circle fan
//! - `fragment`: translucent constant fill
//!
//! WebGPU has no geometry shaders, so expansion is done by vertex pulling:
//! each point is one instance, and the fan slot comes from the index buffer
//! through `vertex_index`.

/// Entry point of the combined vertex/geometry module
pub const VERTEX_ENTRY: &str = "vs_main";

/// Entry point of the fragment module
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Uniform block shared by every stage
///
/// Must match [`crate::primitives::ExpansionUniforms`] exactly.
pub const UNIFORMS_WGSL: &str = r#"
struct ExpansionUniforms {
    mvp: mat4x4<f32>,
    resolution: vec2<f32>,
    radius: f32,
    order: u32,
    fill_color: vec4<f32>,
}

@group(0) @binding(0) var<uniform> uniforms: ExpansionUniforms;
"#;

/// Per-point transform
pub const VERTEX_STAGE: &str = r#"
fn transform_point(point: vec2<f32>) -> vec4<f32> {
    return uniforms.mvp * vec4<f32>(point, 0.0, 1.0);
}
"#;

/// Point-to-fan expansion
///
/// Slot 0 is the centre, slots `1..=n+1` walk the rim and the last one closes
/// the loop. The horizontal offset is scaled by height/width so circles stay
/// round at any aspect ratio.
pub const GEOMETRY_STAGE: &str = r#"
const TAU: f32 = 6.283185307179586;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
}

fn fan_offset(slot: u32) -> vec2<f32> {
    if (slot == 0u) {
        return vec2<f32>(0.0, 0.0);
    }
    let n = f32(max(uniforms.order, 3u));
    let theta = f32(slot - 1u) * (TAU / n);
    let x_scale = uniforms.resolution.y / uniforms.resolution.x;
    return vec2<f32>(
        uniforms.radius * cos(theta) * x_scale,
        uniforms.radius * sin(theta),
    );
}

@vertex
fn vs_main(
    @builtin(vertex_index) slot: u32,
    @location(0) point: vec2<f32>,
) -> VertexOutput {
    var out: VertexOutput;
    let center = transform_point(point);
    out.position = center + vec4<f32>(fan_offset(slot), 0.0, 0.0);
    return out;
}
"#;

/// Constant translucent fill
pub const FRAGMENT_STAGE: &str = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return uniforms.fill_color;
}
"#;

/// Per-stage WGSL text
///
/// Defaults to the built-in stages; tests and experiments can swap a single
/// stage out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderSources {
    pub uniforms: String,
    pub vertex: String,
    pub geometry: String,
    pub fragment: String,
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self {
            uniforms: UNIFORMS_WGSL.to_string(),
            vertex: VERTEX_STAGE.to_string(),
            geometry: GEOMETRY_STAGE.to_string(),
            fragment: FRAGMENT_STAGE.to_string(),
        }
    }
}

impl ShaderSources {
    /// Replace the vertex stage
    pub fn with_vertex(mut self, source: impl Into<String>) -> Self {
        self.vertex = source.into();
        self
    }

    /// Replace the geometry stage
    pub fn with_geometry(mut self, source: impl Into<String>) -> Self {
        self.geometry = source.into();
        self
    }

    /// Replace the fragment stage
    pub fn with_fragment(mut self, source: impl Into<String>) -> Self {
        self.fragment = source.into();
        self
    }

    /// Module text for the vertex stage on its own
    pub fn vertex_module(&self) -> String {
        format!("{}{}", self.uniforms, self.vertex)
    }

    /// Module text carrying the expansion entry point
    pub fn geometry_module(&self) -> String {
        format!("{}{}{}", self.uniforms, self.vertex, self.geometry)
    }

    /// Module text for the fragment stage
    pub fn fragment_module(&self) -> String {
        format!("{}{}", self.uniforms, self.fragment)
    }
}
