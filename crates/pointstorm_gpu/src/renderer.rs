//! GPU context and per-frame expansion rendering

use std::sync::Arc;

use pointstorm_core::{frame_transform, FanTemplate, RenderConfig, Resolution};
use wgpu::util::DeviceExt;

use crate::error::GpuError;
use crate::pipeline::ExpansionPipeline;
use crate::primitives::ExpansionUniforms;
use crate::shaders::ShaderSources;
use crate::upload::PointUpload;

/// wgpu instance, adapter, device and queue
pub struct GpuContext {
    /// wgpu instance
    #[allow(dead_code)]
    instance: wgpu::Instance,
    /// GPU adapter
    adapter: wgpu::Adapter,
    /// GPU device
    device: Arc<wgpu::Device>,
    /// Command queue
    queue: Arc<wgpu::Queue>,
}

impl GpuContext {
    /// Get the preferred backend for the current platform
    fn preferred_backends() -> wgpu::Backends {
        #[cfg(target_os = "macos")]
        {
            wgpu::Backends::METAL
        }
        #[cfg(target_os = "windows")]
        {
            wgpu::Backends::DX12
        }
        #[cfg(target_os = "linux")]
        {
            wgpu::Backends::VULKAN | wgpu::Backends::GL
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
        {
            wgpu::Backends::PRIMARY
        }
    }

    fn create_instance() -> wgpu::Instance {
        wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: Self::preferred_backends(),
            ..Default::default()
        })
    }

    /// Create a context without a surface (offscreen rendering, tests)
    pub async fn headless() -> Result<Self, GpuError> {
        let instance = Self::create_instance();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::AdapterNotFound)?;

        Self::from_adapter(instance, adapter).await
    }

    /// Create a context able to present to `window`
    pub async fn with_surface<W>(window: Arc<W>) -> Result<(Self, wgpu::Surface<'static>), GpuError>
    where
        W: raw_window_handle::HasWindowHandle
            + raw_window_handle::HasDisplayHandle
            + Send
            + Sync
            + 'static,
    {
        let instance = Self::create_instance();
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::AdapterNotFound)?;

        let context = Self::from_adapter(instance, adapter).await?;
        Ok((context, surface))
    }

    async fn from_adapter(instance: wgpu::Instance, adapter: wgpu::Adapter) -> Result<Self, GpuError> {
        let info = adapter.get_info();
        tracing::info!("Using GPU adapter: {} ({:?})", info.name, info.backend);

        // The point cloud is one large static buffer; ask for as much as the
        // adapter allows and keep everything else at the portable baseline
        let adapter_limits = adapter.limits();
        let required_limits = wgpu::Limits {
            max_buffer_size: adapter_limits.max_buffer_size,
            ..wgpu::Limits::downlevel_defaults()
        }
        .using_resolution(adapter_limits.clone());
        tracing::debug!(
            "Max buffer size: {} MiB",
            required_limits.max_buffer_size / (1024 * 1024)
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Pointstorm GPU Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits,
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    pub fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }

    /// Largest single buffer the device accepts
    pub fn max_buffer_size(&self) -> u64 {
        self.device.limits().max_buffer_size
    }

    /// Upload a point buffer once, chunked to the device limit
    pub fn upload(&self, points: &pointstorm_core::PointBuffer) -> Result<PointUpload, GpuError> {
        PointUpload::new(&self.device, points, self.max_buffer_size())
    }

    /// Surface configuration for a window of the given size
    pub fn surface_config(
        &self,
        surface: &wgpu::Surface<'_>,
        resolution: Resolution,
        vsync: bool,
    ) -> Result<wgpu::SurfaceConfiguration, GpuError> {
        let caps = surface.get_capabilities(&self.adapter);
        tracing::debug!("Surface capabilities - formats: {:?}", caps.formats);
        tracing::debug!("Surface capabilities - alpha modes: {:?}", caps.alpha_modes);

        let format = preferred_surface_format(&caps.formats).ok_or(GpuError::SurfaceUnsupported)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: resolution.width.max(1),
            height: resolution.height.max(1),
            present_mode: if vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        })
    }
}

/// Pick the surface format, preferring a non-sRGB one
///
/// Blending then operates on stored values without gamma conversion.
pub fn preferred_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first())
        .copied()
}

/// Draws an uploaded point cloud as blended circles
///
/// Holds everything that stays fixed between frames: pipeline, uniform buffer
/// and the fan index buffer. The only per-frame host work is one uniform
/// write.
pub struct ExpansionRenderer {
    pipeline: ExpansionPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    index_buffer: wgpu::Buffer,
    fan: FanTemplate,
    radius: f32,
    fill_color: [f32; 4],
    clear_color: wgpu::Color,
}

impl ExpansionRenderer {
    /// Build the pipeline and fixed resources for `target_format`
    pub fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        config: &RenderConfig,
        sources: &ShaderSources,
    ) -> Result<Self, GpuError> {
        let fan = config.fan()?;
        let pipeline = ExpansionPipeline::new(device, target_format, sources)?;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Expansion Uniforms"),
            size: std::mem::size_of::<ExpansionUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Expansion Bind Group"),
            layout: pipeline.bind_group_layout(),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Fan Index Buffer"),
            contents: bytemuck::cast_slice(&fan.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        let [r, g, b, a] = config.clear_color;

        Ok(Self {
            pipeline,
            uniform_buffer,
            bind_group,
            index_buffer,
            fan,
            radius: config.radius,
            fill_color: config.fill_rgba(),
            clear_color: wgpu::Color { r, g, b, a },
        })
    }

    pub fn fan(&self) -> FanTemplate {
        self.fan
    }

    /// Uniforms for one frame
    pub fn frame_uniforms(&self, resolution: Resolution, elapsed_seconds: f32) -> ExpansionUniforms {
        ExpansionUniforms::new(
            frame_transform(elapsed_seconds, resolution),
            resolution,
            self.radius,
            self.fan,
            self.fill_color,
        )
    }

    /// Encode one frame: clear, then draw every uploaded point as a fan
    ///
    /// Nothing is encoded for a zero-area resolution. Returns the number of
    /// draw calls issued.
    pub fn render(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        upload: &PointUpload,
        resolution: Resolution,
        elapsed_seconds: f32,
    ) -> usize {
        if !resolution.is_drawable() {
            return 0;
        }

        let uniforms = self.frame_uniforms(resolution, elapsed_seconds);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Expansion Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(self.pipeline.pipeline());
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);

        let index_count = self.fan.index_count();
        for chunk in upload.chunks() {
            pass.set_vertex_buffer(0, chunk.buffer().slice(..));
            pass.draw_indexed(0..index_count, 0, 0..chunk.count());
        }

        upload.chunks().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat;

    #[test]
    fn test_prefers_linear_surface_format() {
        let formats = [TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm];
        assert_eq!(preferred_surface_format(&formats), Some(TextureFormat::Bgra8Unorm));

        let formats = [TextureFormat::Rgba8UnormSrgb, TextureFormat::Rgba8Unorm];
        assert_eq!(preferred_surface_format(&formats), Some(TextureFormat::Rgba8Unorm));
    }

    #[test]
    fn test_falls_back_to_first_format() {
        let formats = [TextureFormat::Bgra8UnormSrgb];
        assert_eq!(
            preferred_surface_format(&formats),
            Some(TextureFormat::Bgra8UnormSrgb)
        );
        assert_eq!(preferred_surface_format(&[]), None);
    }
}
