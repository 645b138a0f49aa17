// src/time.rs
//! Frame timing: wall-clock delta measurement and rolling FPS stats.
//!
//! The clock reports the *raw* elapsed time; the simulation loop clamps it
//! to [`crate::sim::MAX_TICK_DT`] before integrating, so a long gap (tab
//! switch, debugger pause) simulates as one short tick instead of a
//! physics explosion.

/// Snapshot of timing data passed around each frame (Copy, cheap).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Time {
    /// Raw wall-clock delta since the previous frame, seconds.
    pub raw_delta: f32,
    /// Wall-clock seconds since startup.
    pub total: f64,
    pub frame: u64,
    /// Smoothed frames per second.
    pub fps: f32,
}

#[derive(Debug)]
pub struct FrameClock {
    start: f64,
    last_frame: f64,
    frame: u64,
    smoothed_delta: f32,
    smoothing: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = now_seconds();
        Self {
            start: now,
            last_frame: now,
            frame: 0,
            smoothed_delta: 1.0 / 60.0,
            smoothing: 0.2,
        }
    }

    /// Update timing — call once per frame at the very beginning.
    pub fn tick(&mut self) -> Time {
        let now = now_seconds();
        let raw_delta = (now - self.last_frame).max(0.0) as f32;
        self.last_frame = now;
        self.frame += 1;

        // EMA keeps the displayed FPS readable without hiding real dips.
        self.smoothed_delta =
            self.smoothed_delta * (1.0 - self.smoothing) + raw_delta * self.smoothing;
        let fps = if self.smoothed_delta > 0.0 {
            1.0 / self.smoothed_delta
        } else {
            0.0
        };

        Time {
            raw_delta,
            total: now - self.start,
            frame: self.frame,
            fps,
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn now_seconds() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed().as_secs_f64()
}

/// `std::time::Instant` is unavailable on wasm; the browser clock is.
#[cfg(target_arch = "wasm32")]
fn now_seconds() -> f64 {
    js_sys::Date::now() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_are_non_negative_and_frames_count_up() {
        let mut clock = FrameClock::new();
        let mut last_total = 0.0;
        for i in 1..=50 {
            let t = clock.tick();
            assert!(t.raw_delta >= 0.0);
            assert!(t.total >= last_total);
            assert_eq!(t.frame, i);
            last_total = t.total;
        }
    }

    #[test]
    fn fps_is_finite_after_a_real_pause() {
        let mut clock = FrameClock::new();
        clock.tick();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let t = clock.tick();
        assert!(t.raw_delta >= 0.004);
        assert!(t.fps.is_finite() && t.fps > 0.0);
    }
}
