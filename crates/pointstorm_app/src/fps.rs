//! Frames-per-second counter

use std::time::{Duration, Instant};

/// Counts frames and reports the count once per interval
#[derive(Debug)]
pub struct FrameCounter {
    interval: Duration,
    window_start: Instant,
    frames: u32,
}

impl FrameCounter {
    /// One-second counter starting now
    pub fn new() -> Self {
        Self::starting_at(Instant::now(), Duration::from_secs(1))
    }

    pub fn starting_at(start: Instant, interval: Duration) -> Self {
        Self {
            interval,
            window_start: start,
            frames: 0,
        }
    }

    /// Record a presented frame; returns the frame count once a full
    /// interval has passed
    pub fn tick(&mut self, now: Instant) -> Option<u32> {
        self.frames += 1;
        if now.saturating_duration_since(self.window_start) >= self.interval {
            let frames = self.frames;
            self.frames = 0;
            self.window_start = now;
            Some(frames)
        } else {
            None
        }
    }
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_once_per_interval() {
        let start = Instant::now();
        let mut counter = FrameCounter::starting_at(start, Duration::from_secs(1));

        for i in 1..60 {
            assert_eq!(counter.tick(start + Duration::from_millis(i * 16)), None);
        }
        assert_eq!(counter.tick(start + Duration::from_millis(1000)), Some(60));

        // Counting restarts after a report
        assert_eq!(counter.tick(start + Duration::from_millis(1500)), None);
        assert_eq!(counter.tick(start + Duration::from_millis(2000)), Some(2));
    }
}
