//! Expansion pipeline construction
//!
//! Each WGSL stage is parsed and validated with naga before wgpu sees it, so a
//! broken stage is reported by name together with naga's diagnostic instead
//! of surfacing as an uncaptured device error. After the stages compile, a
//! link step checks entry points and the vertex → fragment interface.

use std::collections::BTreeSet;

use crate::error::{PipelineError, ShaderStage};
use crate::primitives::point_vertex_layout;
use crate::shaders::{ShaderSources, FRAGMENT_ENTRY, VERTEX_ENTRY};

/// Validated naga modules for the whole program
#[derive(Debug)]
pub struct ShaderProgram {
    /// Module carrying the vertex + geometry stages
    pub geometry: naga::Module,
    /// Module carrying the fragment stage
    pub fragment: naga::Module,
    geometry_source: String,
    fragment_source: String,
}

impl ShaderProgram {
    /// Compile every stage in order, then link
    pub fn compile(sources: &ShaderSources) -> Result<Self, PipelineError> {
        // The vertex stage is checked alone first so errors in it are not
        // blamed on the geometry stage that includes it
        compile_stage(ShaderStage::Vertex, &sources.vertex_module())?;

        let geometry_source = sources.geometry_module();
        let geometry = compile_stage(ShaderStage::Geometry, &geometry_source)?;

        let fragment_source = sources.fragment_module();
        let fragment = compile_stage(ShaderStage::Fragment, &fragment_source)?;

        link(&geometry, &fragment)?;

        Ok(Self {
            geometry,
            fragment,
            geometry_source,
            fragment_source,
        })
    }

    pub fn geometry_source(&self) -> &str {
        &self.geometry_source
    }

    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }
}

/// Parse and validate one stage
pub fn compile_stage(stage: ShaderStage, source: &str) -> Result<naga::Module, PipelineError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| PipelineError::Compile {
        stage,
        diagnostic: e.emit_to_string(source),
    })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    );
    validator
        .validate(&module)
        .map_err(|e| PipelineError::Compile {
            stage,
            diagnostic: e.emit_to_string(source),
        })?;

    Ok(module)
}

fn find_entry<'a>(
    module: &'a naga::Module,
    stage: naga::ShaderStage,
    name: &str,
) -> Result<&'a naga::EntryPoint, PipelineError> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage && ep.name == name)
        .ok_or_else(|| PipelineError::Link(format!("missing {stage:?} entry point `{name}`")))
}

/// Collect user-defined `@location`s reachable from a binding or struct type
fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut BTreeSet<u32>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            out.insert(*location);
        }
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { ref members, .. } = module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

fn output_locations(module: &naga::Module, function: &naga::Function) -> BTreeSet<u32> {
    let mut out = BTreeSet::new();
    if let Some(ref result) = function.result {
        collect_locations(module, result.ty, result.binding.as_ref(), &mut out);
    }
    out
}

fn input_locations(module: &naga::Module, function: &naga::Function) -> BTreeSet<u32> {
    let mut out = BTreeSet::new();
    for arg in &function.arguments {
        collect_locations(module, arg.ty, arg.binding.as_ref(), &mut out);
    }
    out
}

/// Check that the stages form one program
fn link(geometry: &naga::Module, fragment: &naga::Module) -> Result<(), PipelineError> {
    let vs = find_entry(geometry, naga::ShaderStage::Vertex, VERTEX_ENTRY)?;
    let fs = find_entry(fragment, naga::ShaderStage::Fragment, FRAGMENT_ENTRY)?;

    let produced = output_locations(geometry, &vs.function);
    let consumed = input_locations(fragment, &fs.function);
    if let Some(missing) = consumed.difference(&produced).next() {
        return Err(PipelineError::Link(format!(
            "fragment input @location({missing}) is not written by `{VERTEX_ENTRY}`"
        )));
    }

    if !output_locations(fragment, &fs.function).contains(&0) {
        return Err(PipelineError::Link(format!(
            "`{FRAGMENT_ENTRY}` does not write @location(0)"
        )));
    }

    Ok(())
}

/// Render pipeline that turns instanced points into blended circle fans
pub struct ExpansionPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl ExpansionPipeline {
    /// Build the pipeline for the given target format
    ///
    /// Returns no pipeline at all when any stage fails; there is no partial
    /// program to fall back on.
    pub fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        sources: &ShaderSources,
    ) -> Result<Self, PipelineError> {
        let program = ShaderProgram::compile(sources)?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let geometry_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Expansion Geometry Shader"),
            source: wgpu::ShaderSource::Wgsl(program.geometry_source().into()),
        });

        let fragment_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Expansion Fragment Shader"),
            source: wgpu::ShaderSource::Wgsl(program.fragment_source().into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Expansion Bind Group Layout"),
            entries: &[
                // Uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Expansion Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Expansion Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &geometry_shader,
                entry_point: Some(VERTEX_ENTRY),
                buffers: &[point_vertex_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_shader,
                entry_point: Some(FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::SrcAlpha,
                            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                            operation: wgpu::BlendOperation::Add,
                        },
                        alpha: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                            operation: wgpu::BlendOperation::Add,
                        },
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(PipelineError::Link(err.to_string()));
        }

        tracing::debug!(?target_format, "Expansion pipeline created");

        Ok(Self {
            pipeline,
            bind_group_layout,
        })
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sources_compile_and_link() {
        let program = ShaderProgram::compile(&ShaderSources::default()).unwrap();
        assert!(program
            .geometry
            .entry_points
            .iter()
            .any(|ep| ep.name == VERTEX_ENTRY));
        assert!(program
            .fragment
            .entry_points
            .iter()
            .any(|ep| ep.name == FRAGMENT_ENTRY));
    }

    #[test]
    fn test_vertex_syntax_error_names_vertex() {
        let sources = ShaderSources::default().with_vertex(
            "fn transform_point(point: vec2<f32>) -> vec4<f32> { return uniforms.mvp * ; }",
        );
        let err = ShaderProgram::compile(&sources).unwrap_err();
        assert_eq!(err.stage(), Some(ShaderStage::Vertex));
        assert!(err.to_string().starts_with("vertex shader failed to compile"));
    }

    #[test]
    fn test_geometry_syntax_error_names_geometry() {
        let broken = ShaderSources::default()
            .geometry
            .replace("out.position = center", "out.position = center +");
        let sources = ShaderSources::default().with_geometry(broken);
        let err = ShaderProgram::compile(&sources).unwrap_err();
        assert_eq!(err.stage(), Some(ShaderStage::Geometry));
        assert!(err.to_string().contains("geometry"));
    }

    #[test]
    fn test_fragment_type_error_names_fragment() {
        let sources = ShaderSources::default().with_fragment(
            "@fragment\nfn fs_main() -> @location(0) vec4<f32> {\n    return uniforms.radius;\n}\n",
        );
        let err = ShaderProgram::compile(&sources).unwrap_err();
        assert_eq!(err.stage(), Some(ShaderStage::Fragment));
        match err {
            PipelineError::Compile { diagnostic, .. } => assert!(!diagnostic.is_empty()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unmatched_fragment_input_fails_link() {
        let sources = ShaderSources::default().with_fragment(
            "@fragment\nfn fs_main(@location(3) tint: vec4<f32>) -> @location(0) vec4<f32> {\n    return tint * uniforms.fill_color;\n}\n",
        );
        let err = ShaderProgram::compile(&sources).unwrap_err();
        assert!(matches!(err, PipelineError::Link(_)));
        assert_eq!(err.stage(), None);
    }

    #[test]
    fn test_missing_entry_point_fails_link() {
        let sources = ShaderSources::default().with_fragment(
            "@fragment\nfn main() -> @location(0) vec4<f32> {\n    return uniforms.fill_color;\n}\n",
        );
        let err = ShaderProgram::compile(&sources).unwrap_err();
        assert!(matches!(err, PipelineError::Link(msg) if msg.contains(FRAGMENT_ENTRY)));
    }
}
