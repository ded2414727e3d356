//! Frame timing.
//!
//! The simulation is frame-driven: whatever wall-clock time passed since the
//! previous frame is fed directly into the integrators, so frame-rate
//! variance changes simulation speed but never correctness. A long stall
//! (window dragged, machine suspended) would otherwise arrive as one huge
//! delta and produce a visible jump, so deltas are clamped to a ceiling.

use std::time::Instant;

/// Largest delta ever handed to the simulation, in seconds.
const MAX_DELTA: f32 = 0.25;

/// Per-frame clock: delta time, elapsed time, frame count.
///
/// # Example
///
/// ```
/// use plume::time::FrameClock;
///
/// let mut clock = FrameClock::new();
/// let dt = clock.tick();
/// assert!(dt >= 0.0);
/// assert_eq!(clock.frame(), 1);
/// ```
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    paused: bool,
    /// Fixed delta for deterministic updates (tests, headless runs).
    fixed_delta: Option<f32>,
    /// Speed multiplier applied to every delta.
    time_scale: f32,
}

impl FrameClock {
    /// Create a clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            paused: false,
            fixed_delta: None,
            time_scale: 1.0,
        }
    }

    /// Advance the clock by one frame and return the delta in seconds.
    ///
    /// While paused the delta is 0 and elapsed time stops accumulating.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        if self.paused {
            self.delta_secs = 0.0;
            return 0.0;
        }

        let dt = self.fixed_delta.unwrap_or_else(|| raw.min(MAX_DELTA));
        self.delta_secs = dt * self.time_scale;
        self.elapsed_secs += self.delta_secs;
        self.frame_count += 1;
        self.delta_secs
    }

    /// Time since the last frame in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total simulated time in seconds.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Total ticks since creation.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Whether the clock is paused.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause time progression; `tick()` yields 0 until resumed.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume after a pause. The pause gap never reaches the simulation.
    pub fn resume(&mut self) {
        self.last_frame = Instant::now();
        self.paused = false;
    }

    /// Use a fixed delta instead of wall-clock time.
    ///
    /// Pass `None` to return to real frame timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }

    /// Set the speed multiplier (1.0 = real time). Clamped to non-negative.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// The instant the clock was created.
    #[inline]
    pub fn start_instant(&self) -> Instant {
        self.start
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_tick_advances() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(5));
        let dt = clock.tick();
        assert!(dt > 0.0);
        assert_eq!(clock.frame(), 1);
        assert!(clock.elapsed() >= dt);
    }

    #[test]
    fn test_fixed_delta() {
        let mut clock = FrameClock::new();
        clock.set_fixed_delta(Some(1.0 / 60.0));
        thread::sleep(Duration::from_millis(20));
        let dt = clock.tick();
        assert!((dt - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_pause_yields_zero_delta() {
        let mut clock = FrameClock::new();
        clock.tick();
        clock.pause();
        thread::sleep(Duration::from_millis(5));
        assert_eq!(clock.tick(), 0.0);
        let elapsed = clock.elapsed();

        clock.resume();
        let dt = clock.tick();
        // The pause gap must not leak into the post-resume delta.
        assert!(dt < 0.05);
        assert!(clock.elapsed() >= elapsed);
    }

    #[test]
    fn test_time_scale_clamps_negative() {
        let mut clock = FrameClock::new();
        clock.set_time_scale(-2.0);
        clock.set_fixed_delta(Some(1.0));
        assert_eq!(clock.tick(), 0.0);
    }
}
