//! Endless tunnel: culled depth-plane strips along a swaying trajectory.
//!
//! The camera rides the trajectory; planes slide toward it and their slots
//! wrap to the far end as it passes them. Before any geometry is built, the
//! visibility walk intersects each plane's projected hole bounds front to
//! back and cuts the walk at the first empty intersection, so only planes
//! actually visible through the perspective hole cost anything.
//!
//! # Settings
//!
//! | Key | Default | Meaning |
//! |-----|---------|---------|
//! | `plane_count` | 40 | Planes displayed at once |
//! | `ring_points` | 24 | Points per hole ring |
//! | `spacing` | 1.0 | World distance between planes |
//! | `hole_radius` | 2.0 | Base hole radius |
//! | `speed` | 3.0 | Camera speed, world units per second |
//! | `coarseness` | 1 | Ring point stride (2 = half the triangles) |
//! | `fov` | 1.2 | Vertical field of view, radians |
//! | `seed` | 0 | Tunnel seed |

use crate::camera::{Camera, Viewport};
use crate::error::EffectError;
use crate::lifecycle::{Effect, FrameContext};
use crate::render::FrameMesh;
use crate::settings::Settings;
use crate::tunnel::{PlaneRing, RingConfig};
use glam::{Vec2, Vec4};

struct TunnelState {
    ring: PlaneRing,
    camera: Camera,
    fov: f32,
    speed: f32,
    stride: usize,
    /// Projected rings for the current strip pair, allocations reused.
    near: Vec<(Vec2, Vec4)>,
    far: Vec<(Vec2, Vec4)>,
}

/// Fly-through tunnel with per-plane bounding-box culling.
#[derive(Default)]
pub struct TunnelEffect {
    state: Option<TunnelState>,
}

impl TunnelEffect {
    pub fn new() -> Self {
        Self::default()
    }

    /// The plane range drawn last frame, for diagnostics.
    pub fn last_visible(&self) -> Option<std::ops::Range<usize>> {
        self.state.as_ref().map(|s| s.ring.visible_range(&s.camera))
    }
}

impl Effect for TunnelEffect {
    fn start(&mut self, settings: &Settings) -> Result<(), EffectError> {
        let plane_count = settings.int("plane_count", 40);
        if plane_count < 2 {
            return Err(EffectError::invalid_setting(
                "plane_count",
                format!("must be at least 2, got {}", plane_count),
            ));
        }
        let ring_points = settings.int("ring_points", 24);
        if ring_points < 3 {
            return Err(EffectError::invalid_setting(
                "ring_points",
                format!("must be at least 3, got {}", ring_points),
            ));
        }
        let spacing = settings.float("spacing", 1.0);
        if spacing <= 0.0 {
            return Err(EffectError::invalid_setting(
                "spacing",
                format!("must be positive, got {}", spacing),
            ));
        }
        let fov = settings.float("fov", 1.2);
        if !(0.0..std::f32::consts::PI).contains(&fov) || fov == 0.0 {
            return Err(EffectError::invalid_setting(
                "fov",
                format!("must be in (0, pi), got {}", fov),
            ));
        }

        let config = RingConfig {
            plane_count: plane_count as usize,
            ring_points: ring_points as usize,
            spacing,
            hole_radius: settings.float("hole_radius", 2.0),
            ..Default::default()
        };
        let mut ring = PlaneRing::new(config, settings.int("seed", 0) as u64);
        // Build the initial window of planes before the first frame.
        ring.advance(0.0);

        self.state = Some(TunnelState {
            ring,
            camera: Camera::new(Viewport::new(1280.0, 720.0), fov),
            fov,
            speed: settings.float("speed", 3.0),
            stride: settings.int("coarseness", 1).max(1) as usize,
            near: Vec::new(),
            far: Vec::new(),
        });
        Ok(())
    }

    fn stop(&mut self) {
        self.state = None;
    }

    fn render(&mut self, ctx: &FrameContext, mesh: &mut FrameMesh) {
        let Some(state) = &mut self.state else { return };

        state.camera.set_viewport(ctx.viewport, state.fov);
        state.ring.advance(state.speed * ctx.dt);

        let range = state.ring.visible_range(&state.camera);
        if range.len() < 2 {
            return;
        }

        // Depth fade: planes dim toward the far end of the window.
        let window = state.ring.config().plane_count as f32 * state.ring.config().spacing;
        let fade = |ring: &PlaneRing, step: usize| -> f32 {
            let depth = step as f32 * ring.config().spacing - ring.travel();
            (1.0 - depth / window).clamp(0.0, 1.0)
        };

        // Walk back to front so alpha blending composites correctly.
        let last = range.end - 1;
        state.far.clear();
        if let Some(plane) = state.ring.plane(last) {
            state.ring.project_ring(plane, &state.camera, &mut state.far);
        }
        let last_fade = fade(&state.ring, last);
        for (_, color) in &mut state.far {
            color.w *= last_fade;
        }

        for step in (range.start..last).rev() {
            let Some(plane) = state.ring.plane(step) else { break };
            state.near.clear();
            state.ring.project_ring(plane, &state.camera, &mut state.near);

            // Strip vertices carry the fade in alpha. This pair's far ring
            // already got its fade as the previous pair's near ring.
            let near_fade = fade(&state.ring, step);
            for (_, color) in &mut state.near {
                color.w *= near_fade;
            }
            mesh.push_ring_strip(&state.near, &state.far, state.stride);

            std::mem::swap(&mut state.near, &mut state.far);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(dt: f32, elapsed: f32) -> FrameContext {
        FrameContext {
            dt,
            elapsed,
            viewport: Viewport::new(800.0, 600.0),
        }
    }

    #[test]
    fn test_rejects_bad_settings() {
        let mut effect = TunnelEffect::new();
        assert!(effect.start(&Settings::new().with("plane_count", 1)).is_err());
        assert!(effect.start(&Settings::new().with("ring_points", 2)).is_err());
        assert!(effect.start(&Settings::new().with("spacing", 0.0)).is_err());
    }

    #[test]
    fn test_renders_strips() {
        let mut effect = TunnelEffect::new();
        effect.start(&Settings::new()).unwrap();
        let mut mesh = FrameMesh::new();
        effect.render(&frame(1.0 / 60.0, 0.0), &mut mesh);
        assert!(!mesh.is_empty());
    }

    #[test]
    fn test_survives_long_flight() {
        // Many wraps of the plane ring; indices and ranges must stay sane.
        let mut effect = TunnelEffect::new();
        effect
            .start(&Settings::new().with("plane_count", 8).with("speed", 20.0))
            .unwrap();
        let mut mesh = FrameMesh::new();
        let mut elapsed = 0.0;
        for _ in 0..300 {
            elapsed += 1.0 / 60.0;
            mesh.clear();
            effect.render(&frame(1.0 / 60.0, elapsed), &mut mesh);
        }
        let range = effect.last_visible().unwrap();
        assert!(range.end <= range.start + 8);
    }

    #[test]
    fn test_stop_releases_state() {
        let mut effect = TunnelEffect::new();
        effect.start(&Settings::new()).unwrap();
        effect.stop();
        assert!(effect.last_visible().is_none());

        let mut mesh = FrameMesh::new();
        effect.render(&frame(1.0 / 60.0, 0.0), &mut mesh);
        assert!(mesh.is_empty());
    }
}
