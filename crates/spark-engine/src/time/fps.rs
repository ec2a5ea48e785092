use std::time::Instant;

use super::FrameTime;

/// Average frame rate over one reporting interval.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FpsReport {
    pub fps: f32,
    pub frames: u32,
    pub seconds: f32,
}

/// Counts frames and emits an [`FpsReport`] once every `interval` frames.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    interval: u32,
    frames: u32,
    window_start: Option<Instant>,
}

impl FpsCounter {
    /// `interval` of zero disables reporting.
    pub fn new(interval: u32) -> Self {
        Self {
            interval,
            frames: 0,
            window_start: None,
        }
    }

    /// Records one presented frame.
    pub fn record(&mut self, time: &FrameTime) -> Option<FpsReport> {
        if self.interval == 0 {
            return None;
        }

        let start = *self.window_start.get_or_insert(time.now);
        self.frames += 1;

        if self.frames < self.interval {
            return None;
        }

        let seconds = time.now.saturating_duration_since(start).as_secs_f32();
        let frames = self.frames;

        self.frames = 0;
        self.window_start = Some(time.now);

        let fps = if seconds > 0.0 { frames as f32 / seconds } else { 0.0 };
        Some(FpsReport { fps, frames, seconds })
    }
}
