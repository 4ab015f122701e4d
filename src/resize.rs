//! Resize coordination.
//!
//! Two paths feed it: direct surface-size observation (winit `Resized`
//! events), applied immediately, and a fallback path that collapses bursts
//! within a quiet window before firing. Rescheduling cancels and replaces
//! the pending deadline, so callbacks never stack. The fallback records only
//! the deadline; the size is read fresh when it fires, so a stale mid-burst
//! value can never be applied. Zero-area sizes are dropped to keep the
//! camera matrices non-degenerate.

use std::time::{Duration, Instant};
use winit::dpi::PhysicalSize;

/// Quiet window for the fallback path.
pub const DEBOUNCE_QUIET: Duration = Duration::from_millis(250);

pub struct ResizeCoordinator {
    quiet_window: Duration,
    deadline: Option<Instant>,
}

impl ResizeCoordinator {
    pub fn new() -> Self {
        Self::with_quiet_window(DEBOUNCE_QUIET)
    }

    pub fn with_quiet_window(quiet_window: Duration) -> Self {
        Self {
            quiet_window,
            deadline: None,
        }
    }

    /// Observed path: returns the size to apply right away, or `None` for a
    /// degenerate update.
    pub fn observe(&self, size: PhysicalSize<u32>) -> Option<PhysicalSize<u32>> {
        (size.width > 0 && size.height > 0).then_some(size)
    }

    /// Fallback path: pushes the deadline out by the quiet window, replacing
    /// any earlier schedule.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet_window);
    }

    /// Polled from the frame loop; fires once the quiet window has elapsed
    /// without another schedule. The caller reads the current size then.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drops any pending schedule. Safe to call repeatedly.
    pub fn disconnect(&mut self) {
        self.deadline = None;
    }
}

impl Default for ResizeCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Aspect ratio of a surface size.
pub fn aspect_of(size: PhysicalSize<u32>) -> f32 {
    size.width as f32 / size.height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(w: u32, h: u32) -> PhysicalSize<u32> {
        PhysicalSize::new(w, h)
    }

    #[test]
    fn observed_path_applies_immediately() {
        let rc = ResizeCoordinator::new();
        assert_eq!(rc.observe(size(800, 600)), Some(size(800, 600)));
    }

    #[test]
    fn zero_area_is_ignored_on_the_observed_path() {
        let rc = ResizeCoordinator::new();
        assert_eq!(rc.observe(size(0, 600)), None);
        assert_eq!(rc.observe(size(800, 0)), None);
    }

    #[test]
    fn fallback_waits_for_the_quiet_window() {
        let mut rc = ResizeCoordinator::new();
        let now = Instant::now();
        rc.schedule(now);

        assert!(!rc.poll(now + Duration::from_millis(100)));
        assert!(rc.poll(now + Duration::from_millis(250)));
        // Fired once; nothing further pending.
        assert!(!rc.poll(now + Duration::from_millis(500)));
    }

    #[test]
    fn bursts_collapse_to_one_firing() {
        let mut rc = ResizeCoordinator::new();
        let now = Instant::now();
        rc.schedule(now);
        rc.schedule(now + Duration::from_millis(100));
        rc.schedule(now + Duration::from_millis(200));

        // The first deadline has been replaced, not kept.
        assert!(!rc.poll(now + Duration::from_millis(260)));
        assert!(rc.poll(now + Duration::from_millis(450)));
        assert!(!rc.poll(now + Duration::from_millis(700)));
    }

    #[test]
    fn fired_fallback_defers_to_the_current_size() {
        // The coordinator carries no size across the quiet window; whatever
        // the surface reports at fire time is what gets applied.
        let mut rc = ResizeCoordinator::new();
        let now = Instant::now();
        rc.schedule(now);
        assert!(rc.poll(now + DEBOUNCE_QUIET));
        assert_eq!(rc.observe(size(1024, 768)), Some(size(1024, 768)));
        assert_eq!(rc.observe(size(0, 768)), None);
    }

    #[test]
    fn disconnect_drops_pending_work() {
        let mut rc = ResizeCoordinator::new();
        let now = Instant::now();
        rc.schedule(now);
        rc.disconnect();
        rc.disconnect();
        assert!(!rc.poll(now + DEBOUNCE_QUIET * 2));
    }

    #[test]
    fn aspect_matches_dimensions() {
        assert_eq!(aspect_of(size(800, 600)), 800.0 / 600.0);
    }
}
