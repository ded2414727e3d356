//! Drifting smoke: a spring-lattice field advecting billboard particles.
//!
//! Per frame the data flows one way: the lattice relaxes, the pool ages and
//! spawns particles and warps them through the field, the camera projects
//! them, and the visible ones become alpha-faded billboards. Nothing feeds
//! back from rendering into the simulation.
//!
//! # Settings
//!
//! | Key | Default | Meaning |
//! |-----|---------|---------|
//! | `particle_count` | 2048 | Pool capacity |
//! | `lifetime` | 2.0 | Particle lifetime, seconds |
//! | `lattice_size` | 10 | Field grid cells per axis |
//! | `warp` | 2.5 | Field advection strength |
//! | `fov` | 1.2 | Vertical field of view, radians |
//! | `roll_speed` | 0.06 | Camera roll, radians per second |
//! | `emitting` | true | Spawn new particles |
//! | `seed` | 0 | Simulation seed |

use crate::camera::{Camera, Viewport};
use crate::emitter::{EmitterConfig, ParticlePool};
use crate::error::EffectError;
use crate::field::{LatticeConfig, SpringLattice};
use crate::lifecycle::{Effect, FrameContext};
use crate::render::FrameMesh;
use crate::settings::Settings;
use glam::{Vec3, Vec4};

struct SmokeState {
    lattice: SpringLattice,
    pool: ParticlePool,
    camera: Camera,
    fov: f32,
    roll_speed: f32,
    tint: Vec3,
}

/// Billboard smoke column warped by a spring-lattice field.
#[derive(Default)]
pub struct SmokeEffect {
    state: Option<SmokeState>,
}

impl SmokeEffect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pause or resume emission; aging continues and the pool drains while
    /// paused. No-op before `start`.
    pub fn set_emitting(&mut self, emitting: bool) {
        if let Some(state) = &mut self.state {
            state.pool.set_emitting(emitting);
        }
    }

    /// Live particles this frame (0 before start).
    pub fn live_count(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.pool.live_count())
    }
}

impl Effect for SmokeEffect {
    fn start(&mut self, settings: &Settings) -> Result<(), EffectError> {
        let capacity = settings.int("particle_count", 2048);
        if capacity < 1 {
            return Err(EffectError::invalid_setting(
                "particle_count",
                format!("must be at least 1, got {}", capacity),
            ));
        }
        let lifetime = settings.float("lifetime", 2.0);
        if lifetime <= 0.0 {
            return Err(EffectError::invalid_setting(
                "lifetime",
                format!("must be positive, got {}", lifetime),
            ));
        }
        let lattice_size = settings.int("lattice_size", 10);
        if lattice_size < 2 {
            return Err(EffectError::invalid_setting(
                "lattice_size",
                format!("must be at least 2, got {}", lattice_size),
            ));
        }
        let fov = settings.float("fov", 1.2);
        if !(0.0..std::f32::consts::PI).contains(&fov) || fov == 0.0 {
            return Err(EffectError::invalid_setting(
                "fov",
                format!("must be in (0, pi), got {}", fov),
            ));
        }

        let seed = settings.int("seed", 0) as u64;
        let n = lattice_size as usize;
        let lattice = SpringLattice::new(
            LatticeConfig {
                size: (n, n, n),
                ..Default::default()
            },
            seed,
        );

        let pool = ParticlePool::new(
            EmitterConfig {
                capacity: capacity as usize,
                lifetime,
                warp: settings.float("warp", 2.5),
                ..Default::default()
            },
            seed.wrapping_add(1),
        );

        let mut state = SmokeState {
            lattice,
            pool,
            camera: Camera::new(Viewport::new(1280.0, 720.0), fov),
            fov,
            roll_speed: settings.float("roll_speed", 0.06),
            tint: Vec3::new(0.78, 0.80, 0.88),
        };
        state.pool.set_emitting(settings.flag("emitting", true));
        self.state = Some(state);
        Ok(())
    }

    fn stop(&mut self) {
        self.state = None;
    }

    fn render(&mut self, ctx: &FrameContext, mesh: &mut FrameMesh) {
        let Some(state) = &mut self.state else { return };

        state.camera.set_viewport(ctx.viewport, state.fov);
        state.camera.set_roll(ctx.elapsed * state.roll_speed);

        state.lattice.step(ctx.dt);
        state
            .pool
            .update(ctx.dt, Some(&state.lattice), &state.camera);

        let tint = state.tint;
        for particle in state.pool.particles() {
            if !particle.is_alive() {
                continue;
            }
            let Some(billboard) = particle.screen else { continue };
            mesh.push_billboard(
                billboard.pos,
                billboard.half,
                Vec4::new(tint.x, tint.y, tint.z, particle.alpha),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::EffectDriver;

    fn frame(viewport: Viewport, dt: f32, elapsed: f32) -> FrameContext {
        FrameContext {
            dt,
            elapsed,
            viewport,
        }
    }

    #[test]
    fn test_rejects_bad_settings() {
        let mut effect = SmokeEffect::new();
        assert!(effect
            .start(&Settings::new().with("particle_count", 0))
            .is_err());
        assert!(effect.start(&Settings::new().with("lifetime", -1.0)).is_err());
        assert!(effect.start(&Settings::new().with("fov", 4.0)).is_err());
    }

    #[test]
    fn test_produces_geometry_after_warmup() {
        let mut effect = SmokeEffect::new();
        effect
            .start(&Settings::new().with("particle_count", 256).with("lifetime", 1.5))
            .unwrap();

        let viewport = Viewport::new(800.0, 600.0);
        let mut mesh = FrameMesh::new();
        let mut elapsed = 0.0;
        for _ in 0..120 {
            elapsed += 1.0 / 60.0;
            mesh.clear();
            effect.render(&frame(viewport, 1.0 / 60.0, elapsed), &mut mesh);
        }
        assert!(effect.live_count() > 0);
        assert!(!mesh.is_empty());
    }

    #[test]
    fn test_stop_releases_state() {
        let mut effect = SmokeEffect::new();
        effect.start(&Settings::new()).unwrap();
        assert!(effect.state.is_some());
        effect.stop();
        assert!(effect.state.is_none());
        assert_eq!(effect.live_count(), 0);
    }

    #[test]
    fn test_driver_integration() {
        let mut driver = EffectDriver::new(SmokeEffect::new());
        driver.start(&Settings::new().with("particle_count", 64)).unwrap();
        driver.clock_mut().set_fixed_delta(Some(1.0 / 60.0));

        let mut mesh = FrameMesh::new();
        for _ in 0..60 {
            driver.render_frame(Viewport::new(640.0, 480.0), &mut mesh);
        }
        assert!(!mesh.is_empty());
        driver.stop();
        driver.render_frame(Viewport::new(640.0, 480.0), &mut mesh);
        assert!(mesh.is_empty());
    }
}
