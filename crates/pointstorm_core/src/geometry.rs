//! Circle fan template
//!
//! Every point expands into the same fan: slot 0 is the centre and slots
//! `1..=n+1` walk the rim at `θ = (slot - 1) · 2π / n`, the last slot landing
//! back on the first rim angle to close the loop. The GPU stage computes the
//! same offsets from the slot index; this module is the host-side reference
//! and supplies the shared index buffer.

use std::f32::consts::TAU;

use crate::error::ConfigError;
use crate::resolution::Resolution;

/// Maximum vertices a single point may expand into
pub const MAX_FAN_VERTICES: u32 = 96;

/// Smallest polygon that still encloses area
pub const MIN_POLYGON_ORDER: u32 = 3;

/// Largest polygon order that fits in [`MAX_FAN_VERTICES`]
pub const MAX_POLYGON_ORDER: u32 = MAX_FAN_VERTICES - 2;

/// Fan topology for a polygon of a given order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FanTemplate {
    order: u32,
}

impl FanTemplate {
    /// Fan for an `order`-sided polygon; rejects orders whose fan would not fit
    /// the per-point emission budget
    pub fn new(order: u32) -> Result<Self, ConfigError> {
        if !(MIN_POLYGON_ORDER..=MAX_POLYGON_ORDER).contains(&order) {
            return Err(ConfigError::PolygonOrder {
                order,
                min: MIN_POLYGON_ORDER,
                max: MAX_POLYGON_ORDER,
            });
        }
        Ok(Self { order })
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    /// Vertices emitted per point: centre plus `n + 1` rim slots
    pub fn vertex_count(&self) -> u32 {
        self.order + 2
    }

    /// Triangles per point
    pub fn triangle_count(&self) -> u32 {
        self.order
    }

    /// Indices per point in triangle-list form
    pub fn index_count(&self) -> u32 {
        self.order * 3
    }

    /// Triangle-list indices `(0, k, k + 1)` for `k = 1..=n`
    pub fn indices(&self) -> Vec<u16> {
        (1..=self.order as u16).flat_map(|k| [0, k, k + 1]).collect()
    }

    /// Rim angle for a slot (slot 0 is the centre and has none)
    pub fn slot_angle(&self, slot: u32) -> Option<f32> {
        if slot == 0 || slot > self.order + 1 {
            return None;
        }
        Some((slot - 1) as f32 * (TAU / self.order as f32))
    }

    /// Clip-space offset of a slot from the transformed point
    pub fn slot_offset(&self, slot: u32, radius: f32, resolution: Resolution) -> [f32; 2] {
        match self.slot_angle(slot) {
            Some(theta) => [
                radius * theta.cos() * resolution.x_scale(),
                radius * theta.sin(),
            ],
            None => [0.0, 0.0],
        }
    }

    /// All fan vertices for one point already in clip space
    pub fn expand(&self, center: [f32; 2], radius: f32, resolution: Resolution) -> Vec<[f32; 2]> {
        (0..self.vertex_count())
            .map(|slot| {
                let offset = self.slot_offset(slot, radius, resolution);
                [center[0] + offset[0], center[1] + offset[1]]
            })
            .collect()
    }
}

impl Default for FanTemplate {
    fn default() -> Self {
        Self { order: 8 }
    }
}
