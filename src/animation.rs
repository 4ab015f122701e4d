//! Frame-rate bookkeeping for the animation loop.
//!
//! The loop itself is the winit redraw cycle; this tracks its cadence and
//! flags sustained low frame rates. Observational only, the loop never
//! self-throttles.

use std::time::Instant;

/// Frames between FPS checkpoints.
pub const FPS_WINDOW: u32 = 60;
/// Below this the loop emits a low-performance diagnostic. Strict: exactly
/// 30 fps does not trigger it.
pub const LOW_FPS_THRESHOLD: u32 = 30;

pub struct FrameStats {
    frame_count: u32,
    last_checkpoint: Instant,
    fps: u32,
}

impl FrameStats {
    pub fn new(now: Instant) -> Self {
        Self {
            frame_count: 0,
            last_checkpoint: now,
            fps: 60,
        }
    }

    /// Advances the frame counter; at every `FPS_WINDOW`th tick computes the
    /// frame rate over the elapsed wall-clock span and returns it. The span
    /// is clamped to one millisecond so a zero-duration interval can never
    /// divide.
    pub fn on_frame(&mut self, now: Instant) -> Option<u32> {
        self.frame_count += 1;
        if self.frame_count < FPS_WINDOW {
            return None;
        }

        let elapsed_ms = now.duration_since(self.last_checkpoint).as_millis().max(1);
        self.fps = (60_000.0 / elapsed_ms as f64).round() as u32;
        self.last_checkpoint = now;
        self.frame_count = 0;
        Some(self.fps)
    }

    /// Most recently computed frame rate.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Resets counters for a fresh loop start.
    pub fn restart(&mut self, now: Instant) {
        self.frame_count = 0;
        self.last_checkpoint = now;
    }
}

/// Whether a computed rate warrants the low-performance diagnostic.
pub fn is_low_fps(fps: u32) -> bool {
    fps < LOW_FPS_THRESHOLD
}
