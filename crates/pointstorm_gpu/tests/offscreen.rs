//! Offscreen rendering tests
//!
//! Render into an `Rgba8Unorm` texture and read the pixels back. Skipped when
//! the machine has no usable adapter.

use pointstorm_core::{Point, PointBuffer, RenderConfig, Resolution};
use pointstorm_gpu::{
    preferred_surface_format, ExpansionRenderer, GpuContext, GpuError, PipelineError, ShaderSources,
    ShaderStage,
};

const WIDTH: u32 = 64;
const HEIGHT: u32 = 64;
const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

fn gpu() -> Option<GpuContext> {
    match pollster::block_on(GpuContext::headless()) {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("skipping GPU test: {e}");
            None
        }
    }
}

fn create_target(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Test Target"),
        size: wgpu::Extent3d {
            width: WIDTH,
            height: HEIGHT,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

/// Padded bytes per row for wgpu buffer alignment
fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Render `points` once and return tightly packed RGBA rows
fn render_points(ctx: &GpuContext, points: &PointBuffer, config: &RenderConfig) -> (usize, Vec<u8>) {
    render_points_as(ctx, points, config, FORMAT)
}

fn render_points_as(
    ctx: &GpuContext,
    points: &PointBuffer,
    config: &RenderConfig,
    format: wgpu::TextureFormat,
) -> (usize, Vec<u8>) {
    let device = ctx.device();
    let queue = ctx.queue();

    let renderer = ExpansionRenderer::new(device, format, config, &ShaderSources::default())
        .expect("pipeline should build");
    let upload = ctx.upload(points).expect("upload should succeed");
    let (texture, view) = create_target(device, format);

    let bytes_per_row = padded_bytes_per_row(WIDTH);
    let readback = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Readback Buffer"),
        size: (bytes_per_row * HEIGHT) as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Test Encoder"),
    });
    let draws = renderer.render(
        queue,
        &mut encoder,
        &view,
        &upload,
        Resolution::new(WIDTH, HEIGHT),
        0.0,
    );
    encoder.copy_texture_to_buffer(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::ImageCopyBuffer {
            buffer: &readback,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(HEIGHT),
            },
        },
        wgpu::Extent3d {
            width: WIDTH,
            height: HEIGHT,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(Some(encoder.finish()));

    let slice = readback.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device.poll(wgpu::Maintain::Wait);
    rx.recv().unwrap().unwrap();

    let data = slice.get_mapped_range();
    let mut pixels = Vec::with_capacity((WIDTH * HEIGHT * 4) as usize);
    for row in 0..HEIGHT {
        let start = (row * bytes_per_row) as usize;
        pixels.extend_from_slice(&data[start..start + (WIDTH * 4) as usize]);
    }
    drop(data);
    readback.unmap();

    (draws, pixels)
}

fn pixel(pixels: &[u8], x: u32, y: u32) -> [u8; 4] {
    let i = ((y * WIDTH + x) * 4) as usize;
    [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
}

#[test]
fn test_empty_cloud_draws_nothing() {
    let Some(ctx) = gpu() else { return };

    let (draws, pixels) = render_points(&ctx, &PointBuffer::empty(), &RenderConfig::default());
    assert_eq!(draws, 1);
    assert!(pixels.chunks(4).all(|p| p == [0, 0, 0, 255]));
}

#[test]
fn test_single_point_becomes_translucent_circle() {
    let Some(ctx) = gpu() else { return };

    let config = RenderConfig {
        radius: 0.25,
        ..Default::default()
    };
    let points = PointBuffer::from(vec![Point::new(0.0, 0.0)]);
    let (_, pixels) = render_points(&ctx, &points, &config);

    let center = pixel(&pixels, WIDTH / 2, HEIGHT / 2);
    // 5% red over black
    assert!(center[0] > 5 && center[0] < 25, "center was {center:?}");
    assert_eq!(center[1], 0);
    assert_eq!(center[2], 0);

    assert_eq!(pixel(&pixels, 0, 0), [0, 0, 0, 255]);
    assert_eq!(pixel(&pixels, WIDTH - 1, HEIGHT - 1), [0, 0, 0, 255]);
}

#[test]
fn test_overlapping_points_build_density() {
    let Some(ctx) = gpu() else { return };

    let config = RenderConfig {
        radius: 0.25,
        ..Default::default()
    };
    let single = PointBuffer::from(vec![Point::new(0.0, 0.0)]);
    let stacked = PointBuffer::from(vec![Point::new(0.0, 0.0); 20]);

    let (_, one) = render_points(&ctx, &single, &config);
    let (_, many) = render_points(&ctx, &stacked, &config);

    let c = (WIDTH / 2, HEIGHT / 2);
    assert!(pixel(&many, c.0, c.1)[0] > pixel(&one, c.0, c.1)[0]);
}

#[test]
fn test_chosen_surface_format_keeps_layers_translucent() {
    let Some(ctx) = gpu() else { return };

    let config = RenderConfig {
        radius: 0.25,
        ..Default::default()
    };
    let points = PointBuffer::from(vec![Point::new(0.0, 0.0)]);
    let c = (WIDTH / 2, HEIGHT / 2);

    let offered = [wgpu::TextureFormat::Rgba8UnormSrgb, wgpu::TextureFormat::Rgba8Unorm];
    let chosen = preferred_surface_format(&offered).unwrap();
    assert_eq!(chosen, wgpu::TextureFormat::Rgba8Unorm);

    let (_, linear) = render_points_as(&ctx, &points, &config, chosen);
    let (_, srgb) = render_points_as(&ctx, &points, &config, wgpu::TextureFormat::Rgba8UnormSrgb);

    // One 5% layer stays near 13/255 on the chosen format; sRGB encoding
    // would brighten it several times over
    let red = pixel(&linear, c.0, c.1)[0];
    assert!(red > 5 && red < 25, "centre was {red}");
    assert!(pixel(&srgb, c.0, c.1)[0] > red);
}

#[test]
fn test_upload_reports_every_point() {
    let Some(ctx) = gpu() else { return };

    let points = PointBuffer::from(vec![Point::new(0.25, -0.5); 1000]);
    let upload = ctx.upload(&points).unwrap();
    assert_eq!(upload.point_count(), 1000);
    assert_eq!(upload.chunks().iter().map(|c| c.count() as u64).sum::<u64>(), 1000);
}

#[test]
fn test_broken_stage_returns_no_pipeline() {
    let Some(ctx) = gpu() else { return };

    let sources = ShaderSources::default().with_fragment("@fragment fn fs_main( {");
    let result = ExpansionRenderer::new(ctx.device(), FORMAT, &RenderConfig::default(), &sources);
    match result {
        Err(GpuError::Pipeline(err @ PipelineError::Compile { .. })) => {
            assert_eq!(err.stage(), Some(ShaderStage::Fragment));
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("broken fragment stage produced a pipeline"),
    }
}
