//! Drawable surface size

/// Viewport size in physical pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether anything can be drawn at this size (minimized windows report 0)
    pub fn is_drawable(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Width over height, 1.0 when not drawable
    pub fn aspect(&self) -> f32 {
        if self.is_drawable() {
            self.width as f32 / self.height as f32
        } else {
            1.0
        }
    }

    /// Horizontal scale that keeps screen-space circles round
    pub fn x_scale(&self) -> f32 {
        1.0 / self.aspect()
    }

    pub fn as_array(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}
