//! Depth-plane tunnel geometry and visibility culling.
//!
//! A tunnel is a ring buffer of cross-section planes strung along a swaying
//! trajectory. The camera sits at the origin looking along +Y; planes live
//! at increasing depth and slide toward the camera as it advances. When the
//! camera passes a plane, that plane's slot is rebuilt at the far end; the
//! slot index is the absolute step count modulo the displayed plane count,
//! so nothing is ever allocated after startup.
//!
//! The interesting part is the culler: each plane's hole projects to a
//! screen-space bounding rectangle, found in closed form from the extrema
//! of the projected parametric circle. Walking planes front to back and
//! intersecting these rectangles bounds the rendering work to the planes
//! still visible through the perspective hole; the first empty intersection
//! ends the walk, and nothing deeper is drawn.

use crate::camera::{Camera, Rect, NEAR_EPSILON};
use glam::{Vec2, Vec3, Vec4};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// One vertex of a plane's hole ring, in the plane's 2D basis.
#[derive(Clone, Copy, Debug)]
pub struct PlanePoint {
    /// Offset on the (roughly unit) hole shape.
    pub offset: Vec2,
    /// RGBA color carried to the renderer.
    pub color: Vec4,
}

/// One tunnel cross-section.
#[derive(Clone, Debug)]
pub struct DepthPlane {
    /// Absolute step index this slot currently holds.
    pub step: usize,
    /// Trajectory lateral offset (x, z) at this plane's arc position.
    pub lateral: Vec2,
    /// First in-plane basis vector (unit, world space).
    pub basis_u: Vec3,
    /// Second in-plane basis vector (unit, world space, orthogonal to u).
    pub basis_v: Vec3,
    /// Hole radius in world units.
    pub scale: f32,
    /// Hole ring, closed implicitly (last connects back to first).
    pub points: Vec<PlanePoint>,
}

/// Tunnel tuning. Defaults give a slowly snaking neon tube.
#[derive(Clone, Copy, Debug)]
pub struct RingConfig {
    /// Number of planes displayed at once.
    pub plane_count: usize,
    /// Points per hole ring.
    pub ring_points: usize,
    /// World distance between consecutive planes.
    pub spacing: f32,
    /// Base hole radius in world units.
    pub hole_radius: f32,
    /// Trajectory sway amplitude on x and z.
    pub sway_amplitude: Vec2,
    /// Trajectory sway spatial frequency on x and z.
    pub sway_frequency: Vec2,
    /// How far individual ring points wander off the reference circle (0-1).
    pub wobble: f32,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            plane_count: 40,
            ring_points: 24,
            spacing: 1.0,
            hole_radius: 2.0,
            sway_amplitude: Vec2::new(1.6, 1.1),
            sway_frequency: Vec2::new(0.21, 0.13),
            wobble: 0.12,
        }
    }
}

/// Toroidal ring buffer of tunnel planes, built lazily as the camera moves.
pub struct PlaneRing {
    config: RingConfig,
    planes: Vec<DepthPlane>,
    /// Reference hole shape shared by every plane.
    reference: Vec<Vec2>,
    /// Next absolute step to build.
    next_step: usize,
    /// Distance traveled along the trajectory.
    travel: f32,
    /// Trajectory phase offsets, fixed at construction.
    sway_phase: Vec2,
    rng: SmallRng,
}

impl PlaneRing {
    pub fn new(config: RingConfig, seed: u64) -> Self {
        assert!(config.plane_count >= 2, "a tunnel needs at least 2 planes");
        assert!(config.ring_points >= 3, "a hole ring needs at least 3 points");

        let mut rng = SmallRng::seed_from_u64(seed);
        let sway_phase = Vec2::new(
            rng.gen_range(0.0..std::f32::consts::TAU),
            rng.gen_range(0.0..std::f32::consts::TAU),
        );

        let reference = (0..config.ring_points)
            .map(|i| {
                let a = i as f32 / config.ring_points as f32 * std::f32::consts::TAU;
                Vec2::new(a.cos(), a.sin())
            })
            .collect();

        let placeholder = DepthPlane {
            step: usize::MAX,
            lateral: Vec2::ZERO,
            basis_u: Vec3::X,
            basis_v: Vec3::Z,
            scale: config.hole_radius,
            points: Vec::new(),
        };

        Self {
            planes: vec![placeholder; config.plane_count],
            reference,
            next_step: 0,
            travel: 0.0,
            sway_phase,
            config,
            rng,
        }
    }

    pub fn config(&self) -> &RingConfig {
        &self.config
    }

    /// Distance traveled so far.
    pub fn travel(&self) -> f32 {
        self.travel
    }

    /// Absolute step of the nearest displayed plane.
    pub fn base_step(&self) -> usize {
        (self.travel / self.config.spacing) as usize
    }

    /// Trajectory lateral offset at arc position `s`.
    fn lateral_at(&self, s: f32) -> Vec2 {
        let a = self.config.sway_amplitude;
        let f = self.config.sway_frequency;
        Vec2::new(
            a.x * (f.x * s + self.sway_phase.x).sin(),
            a.y * (f.y * s + self.sway_phase.y).sin(),
        )
    }

    /// Advance the camera by `distance` and build any planes that scrolled
    /// into view. Each displayed slot is overwritten in place when its
    /// absolute step wraps around.
    pub fn advance(&mut self, distance: f32) {
        self.travel += distance.max(0.0);
        let wanted = self.base_step() + self.config.plane_count;
        while self.next_step < wanted {
            let step = self.next_step;
            self.build_plane(step);
            self.next_step += 1;
        }
    }

    fn build_plane(&mut self, step: usize) {
        let cfg = self.config;
        let s = step as f32 * cfg.spacing;
        let lateral = self.lateral_at(s);

        // Frenet-ish frame from a finite-difference tangent. The trajectory
        // is dominated by +Y so the Z-up cross product never degenerates.
        let ds = cfg.spacing * 0.5;
        let ahead = self.lateral_at(s + ds);
        let behind = self.lateral_at(s - ds);
        let tangent = Vec3::new(ahead.x - behind.x, 2.0 * ds, ahead.y - behind.y).normalize();
        let basis_u = Vec3::Z.cross(tangent).normalize();
        let basis_v = tangent.cross(basis_u);

        let scale = cfg.hole_radius * self.rng.gen_range(0.92..1.08);
        let hue = (step as f32 * 0.043).fract();
        let wobble = cfg.wobble;

        let points = self
            .reference
            .iter()
            .enumerate()
            .map(|(i, &r)| {
                let jitter = Vec2::new(
                    self.rng.gen_range(-1.0..1.0),
                    self.rng.gen_range(-1.0..1.0),
                );
                // Blend the reference circle toward a jittered variant.
                let offset = r * (1.0 - wobble) + (r + jitter * 0.5) * wobble;
                let point_hue = (hue + i as f32 / self.reference.len() as f32 * 0.08).fract();
                let rgb = hsv_to_rgb(point_hue, 0.75, 1.0);
                PlanePoint {
                    offset,
                    color: Vec4::new(rgb.x, rgb.y, rgb.z, 1.0),
                }
            })
            .collect();

        let slot = step % cfg.plane_count;
        self.planes[slot] = DepthPlane {
            step,
            lateral,
            basis_u,
            basis_v,
            scale,
            points,
        };
    }

    /// The plane currently holding `step`, if it has been built.
    pub fn plane(&self, step: usize) -> Option<&DepthPlane> {
        let plane = &self.planes[step % self.config.plane_count];
        (plane.step == step).then_some(plane)
    }

    /// World-space center of a plane, relative to the camera (which rides
    /// the trajectory itself, so the tunnel sways around it).
    pub fn world_origin(&self, plane: &DepthPlane) -> Vec3 {
        let cam = self.lateral_at(self.travel);
        let depth = plane.step as f32 * self.config.spacing - self.travel;
        Vec3::new(plane.lateral.x - cam.x, depth, plane.lateral.y - cam.y)
    }

    /// Walk displayed planes front to back, intersecting hole bounds, and
    /// return the contiguous range of absolute steps worth drawing. Planes
    /// at or behind the camera are skipped off the front; the walk stops at
    /// the first empty intersection.
    pub fn visible_range(&self, camera: &Camera) -> std::ops::Range<usize> {
        let base = self.base_step();
        let end = self.next_step;
        let mut first = base;

        // Skip planes the camera has reached but not yet passed a full step.
        while first < end {
            let Some(plane) = self.plane(first) else { break };
            if self.world_origin(plane).y > NEAR_EPSILON {
                break;
            }
            first += 1;
        }

        let mut acc = camera.viewport().rect();
        let mut last = first;
        for step in first..end {
            let Some(plane) = self.plane(step) else { break };
            let bounds = projected_circle_bounds(
                camera,
                self.world_origin(plane),
                plane.basis_u,
                plane.basis_v,
                plane.scale,
            );
            acc = acc.intersect(&bounds);
            if acc.is_empty() {
                break;
            }
            last = step + 1;
        }
        first..last
    }

    /// Project a plane's hole ring to screen space, appending
    /// `(pixel, color)` pairs to `out`. Uses the clamped projection: tunnel
    /// geometry must always yield coordinates.
    pub fn project_ring(&self, plane: &DepthPlane, camera: &Camera, out: &mut Vec<(Vec2, Vec4)>) {
        let origin = self.world_origin(plane);
        for point in &plane.points {
            let world = origin
                + (plane.basis_u * point.offset.x + plane.basis_v * point.offset.y) * plane.scale;
            let screen = camera.project_clamped(world);
            out.push((screen.pos, point.color));
        }
    }
}

/// Screen-space bounding rectangle of a projected circle.
///
/// The circle `p(a) = origin + (u cos a + v sin a) * scale` projects to a
/// closed curve whose horizontal extrema satisfy
/// `U cos a + V sin a = W`, a line-against-unit-circle system solved in
/// closed form (and likewise vertically). Degenerate depth is clamped, so
/// the rectangle is always finite.
pub fn projected_circle_bounds(
    camera: &Camera,
    origin: Vec3,
    u: Vec3,
    v: Vec3,
    scale: f32,
) -> Rect {
    let o = camera.to_camera(origin);
    let cu = camera.to_camera(u) * scale;
    let cv = camera.to_camera(v) * scale;

    let focal = camera.focal();
    let center = camera.center();

    let eval = |c: f32, s: f32| -> Vec2 {
        let p = o + cu * c + cv * s;
        let depth = p.y.max(NEAR_EPSILON);
        Vec2::new(
            center.x + focal.x * p.x / depth,
            center.y - focal.y * p.z / depth,
        )
    };

    // Extrema of (X0 + Xc cos a + Xs sin a) / (Y0 + Yc cos a + Ys sin a):
    // setting the derivative to zero collapses to a linear condition in
    // (cos a, sin a).
    let extrema = |x0: f32, xc: f32, xs: f32| -> Option<[(f32, f32); 2]> {
        let lu = xs * o.y - x0 * cv.y;
        let lv = x0 * cu.y - xc * o.y;
        let lw = xc * cv.y - xs * cu.y;
        solve_line_unit_circle(lu, lv, lw)
    };

    let mut min = Vec2::new(f32::MAX, f32::MAX);
    let mut max = Vec2::new(f32::MIN, f32::MIN);
    let mut grow = |p: Vec2| {
        min = min.min(p);
        max = max.max(p);
    };

    let horizontal = extrema(o.x, cu.x, cv.x);
    let vertical = extrema(o.z, cu.z, cv.z);
    match (horizontal, vertical) {
        (Some(h), Some(v)) => {
            for (c, s) in h.into_iter().chain(v) {
                grow(eval(c, s));
            }
        }
        // Degenerate circle (callers are expected not to pass one): fall
        // back to sampled bounds rather than propagating NaN.
        _ => {
            for i in 0..8 {
                let a = i as f32 / 8.0 * std::f32::consts::TAU;
                grow(eval(a.cos(), a.sin()));
            }
        }
    }

    Rect::new(min, max)
}

/// Solve `u cos a + v sin a = w` on the unit circle, returning the two
/// `(cos a, sin a)` roots.
///
/// Precondition: the line actually intersects the circle (`w² <= u² + v²`).
/// Inherited from the projection geometry and asserted here; in release a
/// degenerate system yields `None` and the caller falls back.
fn solve_line_unit_circle(u: f32, v: f32, w: f32) -> Option<[(f32, f32); 2]> {
    let r2 = u * u + v * v;
    if r2 <= f32::EPSILON {
        return None;
    }
    let disc = r2 - w * w;
    debug_assert!(
        disc >= -1e-4 * r2,
        "line-circle system is degenerate: w^2 = {} > u^2+v^2 = {}",
        w * w,
        r2
    );
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    Some([
        ((u * w + v * root) / r2, (v * w - u * root) / r2),
        ((u * w - v * root) / r2, (v * w + u * root) / r2),
    ])
}

/// Count how many planes survive front-to-back bound intersection, starting
/// from `start` (normally the viewport rectangle). The count is where the
/// walk stopped: no plane at or past that index may be rendered.
pub fn visible_plane_count(start: Rect, bounds: impl IntoIterator<Item = Rect>) -> usize {
    let mut acc = start;
    let mut count = 0;
    for rect in bounds {
        acc = acc.intersect(&rect);
        if acc.is_empty() {
            break;
        }
        count += 1;
    }
    count
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let c = v * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h * 6.0) as u32 % 6 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Vec3::new(r + m, g + m, b + m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Viewport;

    fn camera() -> Camera {
        Camera::new(Viewport::new(800.0, 600.0), 1.2)
    }

    #[test]
    fn test_solve_line_unit_circle_roots_lie_on_both() {
        let (u, v, w) = (0.8, -0.5, 0.3);
        let roots = solve_line_unit_circle(u, v, w).unwrap();
        for (c, s) in roots {
            assert!((u * c + v * s - w).abs() < 1e-5);
            assert!((c * c + s * s - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_degenerate_line_returns_none() {
        assert!(solve_line_unit_circle(0.0, 0.0, 1.0).is_none());
    }

    #[test]
    fn test_circle_bounds_contain_sampled_points() {
        let cam = camera();
        let origin = Vec3::new(0.4, 6.0, -0.3);
        let (u, v, scale) = (Vec3::X, Vec3::Z, 1.5);
        let rect = projected_circle_bounds(&cam, origin, u, v, scale);

        for i in 0..64 {
            let a = i as f32 / 64.0 * std::f32::consts::TAU;
            let world = origin + (u * a.cos() + v * a.sin()) * scale;
            let p = cam.project_clamped(world).pos;
            assert!(p.x >= rect.min.x - 1e-2 && p.x <= rect.max.x + 1e-2);
            assert!(p.y >= rect.min.y - 1e-2 && p.y <= rect.max.y + 1e-2);
        }
    }

    #[test]
    fn test_circle_bounds_are_tight_for_centered_circle() {
        // A circle facing the camera dead-on projects to a circle; its
        // bounds are focal * radius / depth each side of center.
        let cam = camera();
        let depth = 5.0;
        let radius = 2.0;
        let rect = projected_circle_bounds(
            &cam,
            Vec3::new(0.0, depth, 0.0),
            Vec3::X,
            Vec3::Z,
            radius,
        );
        let expect = cam.focal().x * radius / depth;
        assert!((rect.max.x - cam.center().x - expect).abs() < 1e-2);
        assert!((cam.center().x - rect.min.x - expect).abs() < 1e-2);
        assert!((rect.max.y - cam.center().y - expect).abs() < 1e-2);
    }

    #[test]
    fn test_visible_plane_count_stops_at_first_empty() {
        let viewport = Rect::new(Vec2::ZERO, Vec2::new(100.0, 100.0));
        let bounds = vec![
            Rect::new(Vec2::new(10.0, 10.0), Vec2::new(90.0, 90.0)),
            Rect::new(Vec2::new(20.0, 20.0), Vec2::new(80.0, 80.0)),
            // Disjoint from the accumulated rect: the walk must stop here.
            Rect::new(Vec2::new(85.0, 85.0), Vec2::new(95.0, 95.0)),
            Rect::new(Vec2::new(30.0, 30.0), Vec2::new(70.0, 70.0)),
        ];
        assert_eq!(visible_plane_count(viewport, bounds), 2);
    }

    #[test]
    fn test_ring_builds_lazily_and_wraps() {
        let mut ring = PlaneRing::new(
            RingConfig {
                plane_count: 8,
                ..Default::default()
            },
            42,
        );
        ring.advance(0.0);
        assert!(ring.plane(0).is_some());
        assert!(ring.plane(7).is_some());
        assert!(ring.plane(8).is_none());

        // Advance past one step: step 8 lands in slot 0, evicting step 0.
        ring.advance(ring.config().spacing * 1.5);
        assert!(ring.plane(0).is_none());
        assert!(ring.plane(8).is_some());
        assert_eq!(ring.plane(8).unwrap().step, 8);
    }

    #[test]
    fn test_visible_range_starts_at_base() {
        let cam = camera();
        let mut ring = PlaneRing::new(RingConfig::default(), 1);
        ring.advance(0.0);
        let range = ring.visible_range(&cam);
        assert!(range.start >= ring.base_step());
        assert!(range.end <= ring.base_step() + ring.config().plane_count);
        // A freshly-built straight-ish tunnel shows more than one plane.
        assert!(range.len() > 1);
    }
}
