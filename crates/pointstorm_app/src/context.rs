//! Render context
//!
//! The only mutable state shared between the resize handler and the frame
//! step. Both run on the event loop thread.

use std::time::Instant;

use pointstorm_core::Resolution;

/// Inputs the core needs for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInputs {
    pub resolution: Resolution,
    pub elapsed_seconds: f32,
}

/// Viewport size, redraw flag and the animation clock
#[derive(Debug)]
pub struct RenderContext {
    resolution: Resolution,
    needs_redraw: bool,
    started: Instant,
}

impl RenderContext {
    pub fn new(resolution: Resolution) -> Self {
        Self::starting_at(resolution, Instant::now())
    }

    /// Context whose animation clock starts at `started`
    pub fn starting_at(resolution: Resolution, started: Instant) -> Self {
        Self {
            resolution,
            needs_redraw: true,
            started,
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Record a new drawable size and ask for a redraw
    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.resolution = Resolution::new(width, height);
        self.needs_redraw = true;
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Start a frame now
    pub fn begin_frame(&mut self) -> FrameInputs {
        self.begin_frame_at(Instant::now())
    }

    /// Start a frame at `now`, clearing the redraw request
    pub fn begin_frame_at(&mut self, now: Instant) -> FrameInputs {
        self.needs_redraw = false;
        FrameInputs {
            resolution: self.resolution,
            elapsed_seconds: now.saturating_duration_since(self.started).as_secs_f32(),
        }
    }
}
