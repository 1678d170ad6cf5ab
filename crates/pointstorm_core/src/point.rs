//! Points and the fixed-length buffer that owns them

use bytemuck::{Pod, Zeroable};

/// A 2D sample
///
/// Must match the `@location(0) vec2<f32>` vertex attribute layout exactly.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Distance from the origin
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

/// Ordered, fixed-length sequence of points
///
/// The length never changes after construction and no mutable access is
/// exposed; the buffer is uploaded once and read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointBuffer {
    points: Vec<Point>,
}

impl PointBuffer {
    /// An empty buffer
    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }

    /// Raw bytes in upload layout (8 bytes per point)
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.points)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// Size of the buffer in bytes
    pub fn byte_len(&self) -> u64 {
        (self.points.len() * std::mem::size_of::<Point>()) as u64
    }
}

impl From<Vec<Point>> for PointBuffer {
    fn from(points: Vec<Point>) -> Self {
        Self { points }
    }
}

impl<'a> IntoIterator for &'a PointBuffer {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_layout() {
        assert_eq!(std::mem::size_of::<Point>(), 8);
        assert_eq!(std::mem::align_of::<Point>(), 4);
    }

    #[test]
    fn test_buffer_bytes() {
        let buffer = PointBuffer::from(vec![Point::new(1.0, 2.0), Point::new(-3.0, 0.5)]);
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.byte_len(), 16);
        assert_eq!(buffer.as_bytes().len(), 16);
        assert_eq!(&buffer.as_bytes()[0..4], &1.0f32.to_ne_bytes());
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = PointBuffer::empty();
        assert!(buffer.is_empty());
        assert_eq!(buffer.byte_len(), 0);
        assert!(buffer.as_bytes().is_empty());
    }
}
