//! Fixed-capacity particle emitter and pool.
//!
//! The pool owns every particle slot for the life of the effect: one
//! contiguous allocation, no per-particle heap traffic, slots recycled in
//! place. A particle's life is a straight line:
//!
//! ```text
//! Dead (slot free) -> Spawned (ttl = lifetime) -> Aging -> Dead (ttl <= 0)
//! ```
//!
//! Spawning runs on a fixed interval of `lifetime / capacity` seconds via a
//! time accumulator, so over any window `T` the spawn count is
//! `floor(T / interval)` give or take one, with no bursts and no starvation.
//! A full pool silently skips spawns; pausing emission halts spawns while
//! aging continues, draining the pool.

use crate::camera::Camera;
use crate::field::SpringLattice;
use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Screen-space placement of a live particle, recomputed every tick.
/// Absent when the particle is at or behind the camera plane.
#[derive(Clone, Copy, Debug)]
pub struct Billboard {
    /// Projected center in pixels.
    pub pos: Vec2,
    /// Depth-scaled half extents in pixels.
    pub half: Vec2,
}

/// One pool slot. Dead when `time_to_live <= 0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// World-space half extents (x, y unused for billboards, z vertical).
    pub size: Vec3,
    pub alpha: f32,
    pub time_to_live: f32,
    /// Per-second size retention, rolled once at spawn.
    size_retain: f32,
    /// Screen placement from the last tick, `None` if invisible.
    pub screen: Option<Billboard>,
}

impl Particle {
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.time_to_live > 0.0
    }
}

/// Emitter tuning. Defaults make a lazy smoke column.
#[derive(Clone, Copy, Debug)]
pub struct EmitterConfig {
    /// Pool capacity; also fixes the spawn interval (`lifetime / capacity`).
    pub capacity: usize,
    /// Particle lifetime in seconds.
    pub lifetime: f32,
    /// World-space spawn point.
    pub source: Vec3,
    /// Radius of positional jitter around the source.
    pub jitter: f32,
    /// Base initial velocity.
    pub velocity: Vec3,
    /// Magnitude of random velocity jitter.
    pub velocity_jitter: f32,
    /// Constant acceleration applied every tick (buoyancy, gravity, wind).
    pub acceleration: Vec3,
    /// Alpha at spawn.
    pub alpha: f32,
    /// Per-second alpha retention (`alpha *= retain^dt`).
    pub alpha_retain: f32,
    /// World-space half extents at spawn.
    pub size: Vec3,
    /// Range of per-second size retention, rolled per particle at spawn.
    pub size_retain: (f32, f32),
    /// Field warp amplitude; 0 disables field advection.
    pub warp: f32,
    /// World units per lattice cell (world positions are divided by this
    /// before sampling the field).
    pub field_scale: f32,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            capacity: 2048,
            lifetime: 2.0,
            source: Vec3::new(0.0, 8.0, -2.0),
            jitter: 0.08,
            velocity: Vec3::new(0.0, 0.0, 1.6),
            velocity_jitter: 0.25,
            acceleration: Vec3::new(0.0, 0.0, 0.4),
            alpha: 0.85,
            alpha_retain: 0.35,
            size: Vec3::splat(0.35),
            size_retain: (0.75, 1.1),
            warp: 2.5,
            field_scale: 0.9,
        }
    }
}

/// Fixed-capacity pool of billboard particles.
pub struct ParticlePool {
    config: EmitterConfig,
    interval: f32,
    particles: Vec<Particle>,
    spawn_accum: f32,
    /// Next slot to try when scanning for a free one.
    cursor: usize,
    emitting: bool,
    rng: SmallRng,
}

impl ParticlePool {
    /// Allocate a pool with every slot dead. The same seed reproduces the
    /// same jitter sequence.
    pub fn new(config: EmitterConfig, seed: u64) -> Self {
        assert!(config.capacity > 0, "pool capacity must be at least 1");
        assert!(config.lifetime > 0.0, "particle lifetime must be positive");
        let interval = config.lifetime / config.capacity as f32;
        Self {
            particles: vec![Particle::default(); config.capacity],
            interval,
            config,
            spawn_accum: 0.0,
            cursor: 0,
            emitting: true,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Seconds between spawn events.
    pub fn spawn_interval(&self) -> f32 {
        self.interval
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// All slots, dead ones included. The renderer walks this and skips
    /// anything without a screen placement.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of live particles. Never exceeds capacity.
    pub fn live_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_alive()).count()
    }

    /// Whether new particles are being emitted.
    pub fn is_emitting(&self) -> bool {
        self.emitting
    }

    /// Pause or resume emission. While paused, aging continues and the
    /// pool drains.
    pub fn set_emitting(&mut self, emitting: bool) {
        self.emitting = emitting;
    }

    /// Move the spawn point (the source may drift between frames).
    pub fn set_source(&mut self, source: Vec3) {
        self.config.source = source;
    }

    /// Advance the pool by `dt`: spawn on schedule, then age, advect, fade
    /// and reproject every live particle.
    pub fn update(&mut self, dt: f32, field: Option<&SpringLattice>, camera: &Camera) {
        if dt <= 0.0 {
            return;
        }

        if self.emitting {
            self.spawn_accum += dt;
            while self.spawn_accum >= self.interval {
                self.spawn_accum -= self.interval;
                self.spawn_one();
            }
        }

        let cfg = self.config;
        let alpha_retain = cfg.alpha_retain.powf(dt);
        for p in &mut self.particles {
            if !p.is_alive() {
                continue;
            }
            p.time_to_live -= dt;
            if !p.is_alive() {
                // Slot is immediately eligible for reuse.
                p.screen = None;
                continue;
            }

            p.velocity += cfg.acceleration * dt;
            p.position += p.velocity * dt;
            if let Some(field) = field {
                if cfg.warp != 0.0 {
                    let sample = field.sample(p.position / cfg.field_scale);
                    p.position += sample * cfg.warp * dt;
                }
            }
            p.alpha *= alpha_retain;
            p.size *= p.size_retain.powf(dt);

            p.screen = camera.project(p.position).map(|sp| Billboard {
                pos: sp.pos,
                half: camera.scale_at(sp.depth) * Vec2::new(p.size.x, p.size.z),
            });
        }
    }

    /// Claim a dead slot and initialize it, or do nothing if the pool is
    /// full. Scans at most one full lap from the cursor.
    fn spawn_one(&mut self) {
        let n = self.particles.len();
        for step in 0..n {
            let idx = (self.cursor + step) % n;
            if self.particles[idx].is_alive() {
                continue;
            }
            self.cursor = (idx + 1) % n;

            let cfg = &self.config;
            let jitter = Vec3::new(
                self.rng.gen_range(-1.0..1.0),
                self.rng.gen_range(-1.0..1.0),
                self.rng.gen_range(-1.0..1.0),
            );
            let vel_jitter = Vec3::new(
                self.rng.gen_range(-1.0..1.0),
                self.rng.gen_range(-1.0..1.0),
                self.rng.gen_range(-1.0..1.0),
            );
            self.particles[idx] = Particle {
                position: cfg.source + jitter * cfg.jitter,
                velocity: cfg.velocity + vel_jitter * cfg.velocity_jitter,
                size: cfg.size,
                alpha: cfg.alpha,
                time_to_live: cfg.lifetime,
                size_retain: self.rng.gen_range(cfg.size_retain.0..=cfg.size_retain.1),
                screen: None,
            };
            return;
        }
        // Pool full: skip this spawn, a slot will free up soon.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Viewport;

    fn camera() -> Camera {
        Camera::new(Viewport::new(640.0, 480.0), 1.2)
    }

    fn pool(capacity: usize, lifetime: f32) -> ParticlePool {
        ParticlePool::new(
            EmitterConfig {
                capacity,
                lifetime,
                ..Default::default()
            },
            0,
        )
    }

    #[test]
    fn test_spawn_interval_is_lifetime_over_capacity() {
        let p = pool(2048, 2.0);
        assert!((p.spawn_interval() - 2.0 / 2048.0).abs() < 1e-7);
    }

    #[test]
    fn test_live_count_never_exceeds_capacity() {
        let cam = camera();
        let mut p = pool(64, 10.0); // long lifetime: pool fills and stays full
        for _ in 0..720 {
            p.update(1.0 / 60.0, None, &cam);
            assert!(p.live_count() <= p.capacity());
        }
        assert!(p.live_count() >= p.capacity() - 1);
    }

    #[test]
    fn test_pause_drains_pool() {
        let cam = camera();
        let mut p = pool(128, 0.5);
        for _ in 0..60 {
            p.update(1.0 / 60.0, None, &cam);
        }
        assert!(p.live_count() > 0);

        p.set_emitting(false);
        for _ in 0..40 {
            p.update(1.0 / 60.0, None, &cam);
        }
        assert_eq!(p.live_count(), 0);
    }

    #[test]
    fn test_behind_camera_is_flagged_invisible() {
        let cam = camera();
        let mut p = ParticlePool::new(
            EmitterConfig {
                capacity: 8,
                lifetime: 5.0,
                source: Vec3::new(0.0, -5.0, 0.0), // behind the camera
                velocity: Vec3::ZERO,
                velocity_jitter: 0.0,
                acceleration: Vec3::ZERO,
                warp: 0.0,
                ..Default::default()
            },
            0,
        );
        for _ in 0..30 {
            p.update(1.0 / 60.0, None, &cam);
        }
        let live: Vec<_> = p.particles().iter().filter(|p| p.is_alive()).collect();
        assert!(!live.is_empty());
        assert!(live.iter().all(|p| p.screen.is_none()));
    }

    #[test]
    fn test_alpha_fades_exponentially() {
        let cam = camera();
        let mut p = pool(4, 100.0);
        // Force one spawn.
        p.update(p.spawn_interval() * 1.5, None, &cam);
        let a0 = p.particles().iter().find(|p| p.is_alive()).unwrap().alpha;
        for _ in 0..60 {
            p.update(1.0 / 60.0, None, &cam);
        }
        let a1 = p.particles().iter().find(|p| p.is_alive()).unwrap().alpha;
        assert!(a1 < a0);
        assert!(a1 > 0.0);
    }
}
