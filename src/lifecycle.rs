//! Effect lifecycle: the contract between an effect and its host.
//!
//! A host drives every effect through three calls:
//!
//! 1. `start` - allocate everything, read settings, report failure.
//! 2. `render` - once per display refresh, advance by the elapsed frame
//!    time and emit this frame's geometry.
//! 3. `stop` - synchronous teardown, idempotent.
//!
//! [`EffectDriver`] enforces the contract's safety rules so individual
//! effects don't have to: `render` on an effect whose `start` failed (or
//! never ran) is a no-op, and `stop` is safe in any state, any number of
//! times. Everything is single-threaded and frame-driven; a frame's
//! simulation and mesh building complete before control returns.

use crate::camera::Viewport;
use crate::error::EffectError;
use crate::render::FrameMesh;
use crate::settings::Settings;
use crate::time::FrameClock;

/// Per-frame inputs supplied by the host.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext {
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Seconds since the effect started.
    pub elapsed: f32,
    /// Current viewport in pixels.
    pub viewport: Viewport,
}

/// A self-contained simulation + renderer pair.
///
/// Implementations hold their runtime state (pools, lattices, plane rings)
/// in an `Option` populated by `start` and dropped by `stop`, so resources
/// are allocated exactly once per run and freed exactly once.
pub trait Effect {
    /// Allocate resources and read configuration. An `Err` leaves the
    /// effect disabled; the driver will never call `render` on it.
    fn start(&mut self, settings: &Settings) -> Result<(), EffectError>;

    /// Release everything `start` allocated. Only called after a
    /// successful `start`, at most once per run.
    fn stop(&mut self);

    /// Advance the simulation by `ctx.dt` and append this frame's geometry.
    fn render(&mut self, ctx: &FrameContext, mesh: &mut FrameMesh);
}

impl<E: Effect + ?Sized> Effect for Box<E> {
    fn start(&mut self, settings: &Settings) -> Result<(), EffectError> {
        (**self).start(settings)
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn render(&mut self, ctx: &FrameContext, mesh: &mut FrameMesh) {
        (**self).render(ctx, mesh)
    }
}

/// Owns an effect and guards its lifecycle.
pub struct EffectDriver<E: Effect> {
    effect: E,
    clock: FrameClock,
    started: bool,
}

impl<E: Effect> EffectDriver<E> {
    pub fn new(effect: E) -> Self {
        Self {
            effect,
            clock: FrameClock::new(),
            started: false,
        }
    }

    /// Start the effect. On failure the effect stays disabled and
    /// subsequent `render_frame` calls do nothing.
    pub fn start(&mut self, settings: &Settings) -> Result<(), EffectError> {
        if self.started {
            return Ok(());
        }
        self.effect.start(settings)?;
        self.clock = FrameClock::new();
        self.started = true;
        Ok(())
    }

    /// Whether `start` has succeeded and `stop` has not yet run.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Drive one frame: clear the mesh, tick the clock, render. A no-op
    /// (leaving the mesh empty) when the effect never started.
    pub fn render_frame(&mut self, viewport: Viewport, mesh: &mut FrameMesh) {
        mesh.clear();
        if !self.started {
            return;
        }
        let dt = self.clock.tick();
        let ctx = FrameContext {
            dt,
            elapsed: self.clock.elapsed(),
            viewport,
        };
        self.effect.render(&ctx, mesh);
    }

    /// Tear the effect down. Idempotent, and safe even if `start` failed
    /// or never ran.
    pub fn stop(&mut self) {
        if self.started {
            self.effect.stop();
            self.started = false;
        }
    }

    /// The frame clock (pause, time scale, fixed delta).
    pub fn clock_mut(&mut self) -> &mut FrameClock {
        &mut self.clock
    }

    pub fn effect(&self) -> &E {
        &self.effect
    }

    pub fn effect_mut(&mut self) -> &mut E {
        &mut self.effect
    }
}

impl<E: Effect> Drop for EffectDriver<E> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        fail_start: bool,
        starts: u32,
        stops: u32,
        renders: u32,
    }

    impl Effect for Probe {
        fn start(&mut self, _settings: &Settings) -> Result<(), EffectError> {
            self.starts += 1;
            if self.fail_start {
                Err(EffectError::invalid_setting("probe", "forced failure"))
            } else {
                Ok(())
            }
        }

        fn stop(&mut self) {
            self.stops += 1;
        }

        fn render(&mut self, _ctx: &FrameContext, _mesh: &mut FrameMesh) {
            self.renders += 1;
        }
    }

    fn viewport() -> Viewport {
        Viewport::new(640.0, 480.0)
    }

    #[test]
    fn test_render_after_failed_start_is_noop() {
        let mut driver = EffectDriver::new(Probe {
            fail_start: true,
            ..Default::default()
        });
        assert!(driver.start(&Settings::new()).is_err());
        assert!(!driver.is_started());

        let mut mesh = FrameMesh::new();
        driver.render_frame(viewport(), &mut mesh);
        assert_eq!(driver.effect().renders, 0);
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_stop_is_idempotent_and_safe_without_start() {
        let mut driver = EffectDriver::new(Probe::default());
        driver.stop();
        driver.stop();
        assert_eq!(driver.effect().stops, 0);

        driver.start(&Settings::new()).unwrap();
        driver.stop();
        driver.stop();
        assert_eq!(driver.effect().stops, 1);
    }

    #[test]
    fn test_render_runs_once_started() {
        let mut driver = EffectDriver::new(Probe::default());
        driver.start(&Settings::new()).unwrap();
        let mut mesh = FrameMesh::new();
        driver.render_frame(viewport(), &mut mesh);
        driver.render_frame(viewport(), &mut mesh);
        assert_eq!(driver.effect().renders, 2);
    }

    #[test]
    fn test_start_twice_starts_once() {
        let mut driver = EffectDriver::new(Probe::default());
        driver.start(&Settings::new()).unwrap();
        driver.start(&Settings::new()).unwrap();
        assert_eq!(driver.effect().starts, 1);
    }
}
