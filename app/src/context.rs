//! Per-frame information handed to the app handler.

use std::time::Duration;

/// Frame timing and window size, available in every handler callback.
#[derive(Debug, Clone, PartialEq)]
pub struct AppContext {
    /// Window width in points.
    pub(crate) width: u32,
    /// Window height in points.
    pub(crate) height: u32,
    /// Pixels per point.
    pub(crate) content_scale: f32,
    /// Frames attempted so far, including dropped ones.
    pub(crate) frame_number: u64,
    /// Frames that were dropped by the renderer.
    pub(crate) dropped_frames: u64,
    /// Time since the previous frame.
    pub(crate) delta_time: Duration,
    /// Time since the runner started.
    pub(crate) elapsed_time: Duration,
}

impl AppContext {
    pub(crate) fn new(width: u32, height: u32, content_scale: f32) -> Self {
        Self {
            width,
            height,
            content_scale,
            frame_number: 0,
            dropped_frames: 0,
            delta_time: Duration::ZERO,
            elapsed_time: Duration::ZERO,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn content_scale(&self) -> f32 {
        self.content_scale
    }

    /// Index of the frame being recorded.
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    /// Seconds since the previous frame.
    pub fn delta_time(&self) -> f32 {
        self.delta_time.as_secs_f32()
    }

    /// Seconds since the runner started.
    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time.as_secs_f32()
    }
}
