//! One-time point upload
//!
//! The point buffer is copied to GPU memory once at startup and never touched
//! again. Buffers larger than the device's `max_buffer_size` are split into
//! consecutive chunks of whole points; draw order follows chunk order.

use pointstorm_core::{Point, PointBuffer};
use wgpu::util::DeviceExt;

use crate::error::GpuError;

const POINT_SIZE: u64 = std::mem::size_of::<Point>() as u64;

/// A contiguous run of uploaded points
#[derive(Debug)]
pub struct PointChunk {
    buffer: wgpu::Buffer,
    count: u32,
}

impl PointChunk {
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Points in this chunk
    pub fn count(&self) -> u32 {
        self.count
    }
}

/// GPU-resident copy of a [`PointBuffer`]
#[derive(Debug)]
pub struct PointUpload {
    chunks: Vec<PointChunk>,
    point_count: u64,
}

impl PointUpload {
    /// Upload `points`, using chunks of at most `max_chunk_bytes`
    ///
    /// Allocation and validation failures are captured and returned as
    /// [`GpuError::Upload`].
    pub fn new(
        device: &wgpu::Device,
        points: &PointBuffer,
        max_chunk_bytes: u64,
    ) -> Result<Self, GpuError> {
        let sizes = plan_chunks(points.len(), max_chunk_bytes);

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

        let chunks = if points.is_empty() {
            // Placeholder so an empty cloud still binds a buffer and issues a
            // zero-instance draw
            vec![PointChunk {
                buffer: device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("Point Buffer (empty)"),
                    size: POINT_SIZE,
                    usage: wgpu::BufferUsages::VERTEX,
                    mapped_at_creation: false,
                }),
                count: 0,
            }]
        } else {
            let mut start = 0;
            sizes
                .iter()
                .enumerate()
                .map(|(i, &len)| {
                    let slice = &points.as_slice()[start..start + len];
                    start += len;
                    PointChunk {
                        buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some(&format!("Point Buffer {i}")),
                            contents: bytemuck::cast_slice(slice),
                            usage: wgpu::BufferUsages::VERTEX,
                        }),
                        count: len as u32,
                    }
                })
                .collect()
        };

        let out_of_memory = pollster::block_on(device.pop_error_scope());
        let validation = pollster::block_on(device.pop_error_scope());
        if let Some(err) = out_of_memory.or(validation) {
            return Err(GpuError::Upload {
                count: points.len(),
                reason: err.to_string(),
            });
        }

        tracing::info!(
            "Uploaded {} points in {} chunk(s) ({:.1} MiB)",
            points.len(),
            chunks.len(),
            points.byte_len() as f64 / (1024.0 * 1024.0)
        );

        Ok(Self {
            chunks,
            point_count: points.len() as u64,
        })
    }

    pub fn chunks(&self) -> &[PointChunk] {
        &self.chunks
    }

    pub fn point_count(&self) -> u64 {
        self.point_count
    }

    pub fn is_empty(&self) -> bool {
        self.point_count == 0
    }
}

/// Split `count` points into chunk lengths no larger than `max_chunk_bytes`
/// (and never more than `u32::MAX` instances each)
///
/// An empty cloud still gets a single zero-length chunk.
pub fn plan_chunks(count: usize, max_chunk_bytes: u64) -> Vec<usize> {
    let per_chunk = (max_chunk_bytes / POINT_SIZE).clamp(1, u32::MAX as u64) as usize;
    if count == 0 {
        return vec![0];
    }

    let mut sizes = Vec::with_capacity(count.div_ceil(per_chunk));
    let mut remaining = count;
    while remaining > 0 {
        let len = remaining.min(per_chunk);
        sizes.push(len);
        remaining -= len;
    }
    sizes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_chunk_when_it_fits() {
        assert_eq!(plan_chunks(1000, 1 << 30), vec![1000]);
    }

    #[test]
    fn test_splits_on_whole_points() {
        // 20 bytes fits two 8-byte points
        assert_eq!(plan_chunks(5, 20), vec![2, 2, 1]);
    }

    #[test]
    fn test_hundred_million_points_under_256_mib() {
        let sizes = plan_chunks(100_000_000, 256 << 20);
        assert_eq!(sizes.iter().sum::<usize>(), 100_000_000);
        assert_eq!(sizes.len(), 3);
        assert!(sizes.iter().all(|&s| s as u64 * POINT_SIZE <= 256 << 20));
    }

    #[test]
    fn test_empty_cloud_gets_one_empty_chunk() {
        assert_eq!(plan_chunks(0, 1 << 20), vec![0]);
    }

    #[test]
    fn test_tiny_limit_still_makes_progress() {
        assert_eq!(plan_chunks(3, 1), vec![1, 1, 1]);
    }
}
