//! Pinhole camera and screen-space geometry.
//!
//! The camera sits at the origin looking along +Y, with +X to the right and
//! +Z up. Projection is the plain pinhole model used by every effect:
//!
//! ```text
//! screen_x = center_x + focal_x * world_x / world_y
//! screen_y = center_y - focal_y * world_z / world_y
//! ```
//!
//! Points at or behind the camera plane (`world_y <= 0`) have no honest
//! projection. Two policies exist, matching the two callers:
//! [`Camera::project`] returns `None` (particles are flagged invisible and
//! skipped), while [`Camera::project_clamped`] substitutes a small positive
//! depth (tunnel geometry that must always yield coordinates).

use glam::{Vec2, Vec3};

/// Smallest depth used in place of a degenerate `world_y <= 0`.
pub const NEAR_EPSILON: f32 = 1e-4;

/// Viewport dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(1.0)
    }

    /// Screen center in pixels.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// The full viewport as a screen-space rectangle.
    pub fn rect(&self) -> Rect {
        Rect {
            min: Vec2::ZERO,
            max: Vec2::new(self.width, self.height),
        }
    }
}

/// Axis-aligned screen-space rectangle used for visibility culling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// A rectangle that intersects to empty with everything.
    pub fn empty() -> Self {
        Self {
            min: Vec2::new(f32::MAX, f32::MAX),
            max: Vec2::new(f32::MIN, f32::MIN),
        }
    }

    /// True when the rectangle encloses no area.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Intersection of two rectangles (possibly empty).
    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }
}

/// A projected point: pixel position plus the camera-space depth it came from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    pub pos: Vec2,
    pub depth: f32,
}

/// Pinhole camera with an optional roll about the view axis.
#[derive(Clone, Debug)]
pub struct Camera {
    viewport: Viewport,
    focal: Vec2,
    center: Vec2,
    roll: f32,
}

impl Camera {
    /// Create a camera for the given viewport and vertical field of view
    /// (radians). Square pixels: the horizontal focal length equals the
    /// vertical one, and aspect falls out of the viewport width.
    pub fn new(viewport: Viewport, fov_y: f32) -> Self {
        let focal_y = (viewport.height * 0.5) / (fov_y * 0.5).tan();
        Self {
            viewport,
            focal: Vec2::splat(focal_y),
            center: viewport.center(),
            roll: 0.0,
        }
    }

    /// Recompute focal lengths and center for a new viewport. Called every
    /// frame by the driver; camera state carries nothing else between frames.
    pub fn set_viewport(&mut self, viewport: Viewport, fov_y: f32) {
        let focal_y = (viewport.height * 0.5) / (fov_y * 0.5).tan();
        self.viewport = viewport;
        self.focal = Vec2::splat(focal_y);
        self.center = viewport.center();
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn focal(&self) -> Vec2 {
        self.focal
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Roll angle in radians about the view (+Y) axis.
    pub fn roll(&self) -> f32 {
        self.roll
    }

    pub fn set_roll(&mut self, roll: f32) {
        self.roll = roll;
    }

    /// World position rotated into camera space (roll applied).
    pub fn to_camera(&self, world: Vec3) -> Vec3 {
        if self.roll == 0.0 {
            return world;
        }
        let (s, c) = self.roll.sin_cos();
        Vec3::new(world.x * c - world.z * s, world.y, world.x * s + world.z * c)
    }

    /// Project a world point, or `None` when it lies at or behind the
    /// camera plane. Callers skip such points rather than drawing them.
    pub fn project(&self, world: Vec3) -> Option<ScreenPoint> {
        let p = self.to_camera(world);
        if p.y <= NEAR_EPSILON {
            return None;
        }
        Some(self.project_depth(p))
    }

    /// Project a world point, clamping degenerate depth to [`NEAR_EPSILON`].
    /// Used where geometry must always produce coordinates.
    pub fn project_clamped(&self, world: Vec3) -> ScreenPoint {
        let mut p = self.to_camera(world);
        p.y = p.y.max(NEAR_EPSILON);
        self.project_depth(p)
    }

    fn project_depth(&self, cam: Vec3) -> ScreenPoint {
        ScreenPoint {
            pos: Vec2::new(
                self.center.x + self.focal.x * cam.x / cam.y,
                self.center.y - self.focal.y * cam.z / cam.y,
            ),
            depth: cam.y,
        }
    }

    /// Pixels per world unit at a given camera-space depth. Used to size
    /// billboards: screen half-extent = world half-extent * scale_at(depth).
    pub fn scale_at(&self, depth: f32) -> Vec2 {
        self.focal / depth.max(NEAR_EPSILON)
    }

    /// Inverse projection: the world-space ray direction through a pixel
    /// (unit depth, not normalized). Reprojecting `world_y > 0` points
    /// through this recovers the original ray up to scale.
    pub fn unproject(&self, screen: Vec2) -> Vec3 {
        let dir = Vec3::new(
            (screen.x - self.center.x) / self.focal.x,
            1.0,
            -(screen.y - self.center.y) / self.focal.y,
        );
        // Undo the roll.
        let (s, c) = (-self.roll).sin_cos();
        Vec3::new(dir.x * c - dir.z * s, dir.y, dir.x * s + dir.z * c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(Viewport::new(800.0, 600.0), std::f32::consts::FRAC_PI_2)
    }

    #[test]
    fn test_center_projects_to_center() {
        let cam = camera();
        let p = cam.project(Vec3::new(0.0, 5.0, 0.0)).unwrap();
        assert!((p.pos.x - 400.0).abs() < 1e-3);
        assert!((p.pos.y - 300.0).abs() < 1e-3);
        assert!((p.depth - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_behind_camera_is_invisible() {
        let cam = camera();
        assert!(cam.project(Vec3::new(0.0, -1.0, 0.0)).is_none());
        assert!(cam.project(Vec3::new(1.0, 0.0, 1.0)).is_none());
    }

    #[test]
    fn test_clamped_projection_never_blows_up() {
        let cam = camera();
        let p = cam.project_clamped(Vec3::new(0.1, -3.0, 0.1));
        assert!(p.pos.x.is_finite());
        assert!(p.pos.y.is_finite());
        assert!(p.depth >= NEAR_EPSILON);
    }

    #[test]
    fn test_unproject_recovers_ray() {
        let cam = camera();
        let world = Vec3::new(1.3, 4.0, -0.7);
        let screen = cam.project(world).unwrap();
        let ray = cam.unproject(screen.pos);
        // Parallel up to scale: cross product vanishes.
        assert!(ray.cross(world).length() < 1e-3 * world.length());
    }

    #[test]
    fn test_unproject_recovers_ray_with_roll() {
        let mut cam = camera();
        cam.set_roll(0.37);
        let world = Vec3::new(-0.4, 2.5, 1.1);
        let screen = cam.project(world).unwrap();
        let ray = cam.unproject(screen.pos);
        assert!(ray.cross(world).length() < 1e-3 * world.length());
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = Rect::new(Vec2::new(5.0, 5.0), Vec2::new(20.0, 20.0));
        let i = a.intersect(&b);
        assert_eq!(i.min, Vec2::new(5.0, 5.0));
        assert_eq!(i.max, Vec2::new(10.0, 10.0));
        assert!(!i.is_empty());

        let c = Rect::new(Vec2::new(11.0, 0.0), Vec2::new(12.0, 10.0));
        assert!(a.intersect(&c).is_empty());
        assert!(a.intersect(&Rect::empty()).is_empty());
    }
}
