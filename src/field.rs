//! Toroidal spring-lattice displacement field.
//!
//! A fixed 3D grid of point masses, each tied to its 26 surrounding
//! neighbors by springs at rest lengths and pulled back toward its own rest
//! position. Integrated every frame with a semi-implicit Euler step, the
//! lattice settles into a smoothly varying displacement field with no seams:
//! coordinate arithmetic wraps on all three axes, so the field tiles space.
//!
//! Particles never read grid cells directly; they query
//! [`SpringLattice::sample`] at fractional coordinates and get a trilinearly
//! interpolated displacement vector to fold into their trajectory.
//!
//! All coordinates here are in grid-cell units. Callers pre-scale world
//! positions into cell units before sampling.

use glam::{IVec3, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// One lattice point: displacement from its rest position, and velocity.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridPoint {
    pub offset: Vec3,
    pub velocity: Vec3,
}

/// Tuning knobs for the lattice.
#[derive(Clone, Copy, Debug)]
pub struct LatticeConfig {
    /// Grid cells per axis.
    pub size: (usize, usize, usize),
    /// Initial sinusoid displacement amplitude, in cell units.
    pub amplitude: f32,
    /// Spring constant for neighbor springs.
    pub stiffness: f32,
    /// Strength of the pull back toward each point's rest position.
    pub origin_pull: f32,
    /// Per-second velocity retention (applied as `damping^dt`).
    pub damping: f32,
    /// Hard bound on displacement magnitude, in cell units.
    pub max_offset: f32,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            size: (10, 10, 10),
            amplitude: 0.45,
            stiffness: 4.0,
            origin_pull: 1.5,
            damping: 0.3,
            max_offset: 1.2,
        }
    }
}

/// Half of the 26-neighbor shell. Each spring is walked once and its force
/// applied symmetrically to both endpoints, which covers the full shell.
const HALF_SHELL: [(i32, i32, i32); 13] = [
    (1, 0, 0),
    (0, 1, 0),
    (1, 1, 0),
    (-1, 1, 0),
    (0, 0, 1),
    (1, 0, 1),
    (-1, 0, 1),
    (0, 1, 1),
    (0, -1, 1),
    (1, 1, 1),
    (-1, 1, 1),
    (1, -1, 1),
    (-1, -1, 1),
];

/// Damped mass-spring lattice on a toroidal 3D grid.
pub struct SpringLattice {
    config: LatticeConfig,
    points: Vec<GridPoint>,
    /// Springs as (relative offset, rest length in cell units).
    springs: [(IVec3, f32); 13],
    /// Per-tick force accumulator, allocated once.
    forces: Vec<Vec3>,
}

impl SpringLattice {
    /// Build a lattice in its "frozen wave" initial state: every point
    /// displaced by independently phased sinusoid pairs of its integer
    /// coordinates, velocities zero. The same seed reproduces the same field.
    pub fn new(config: LatticeConfig, seed: u64) -> Self {
        let (nx, ny, nz) = config.size;
        assert!(nx >= 2 && ny >= 2 && nz >= 2, "lattice must be at least 2 cells per axis");

        let mut rng = SmallRng::seed_from_u64(seed);

        // Two sinusoids per axis component, random phase and spatial rate.
        let mut waves = [[(0.0f32, Vec3::ZERO); 2]; 3];
        for axis in waves.iter_mut() {
            for wave in axis.iter_mut() {
                let phase = rng.gen_range(0.0..std::f32::consts::TAU);
                let rate = Vec3::new(
                    rng.gen_range(-1.2..1.2),
                    rng.gen_range(-1.2..1.2),
                    rng.gen_range(-1.2..1.2),
                );
                *wave = (phase, rate);
            }
        }

        let mut points = Vec::with_capacity(nx * ny * nz);
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    let coord = Vec3::new(x as f32, y as f32, z as f32);
                    let mut offset = Vec3::ZERO;
                    for (k, axis) in waves.iter().enumerate() {
                        let mut v = 0.0;
                        for (phase, rate) in axis {
                            v += (phase + coord.dot(*rate)).sin();
                        }
                        offset[k] = v * 0.5 * config.amplitude;
                    }
                    points.push(GridPoint {
                        offset,
                        velocity: Vec3::ZERO,
                    });
                }
            }
        }

        let springs = HALF_SHELL.map(|(x, y, z)| {
            let off = IVec3::new(x, y, z);
            (off, off.as_vec3().length())
        });

        let forces = vec![Vec3::ZERO; points.len()];
        Self {
            config,
            points,
            springs,
            forces,
        }
    }

    pub fn config(&self) -> &LatticeConfig {
        &self.config
    }

    /// Grid cells per axis.
    pub fn size(&self) -> (usize, usize, usize) {
        self.config.size
    }

    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        let (nx, ny, _) = self.config.size;
        x + nx * (y + ny * z)
    }

    #[inline]
    fn wrapped_index(&self, x: i32, y: i32, z: i32) -> usize {
        let (nx, ny, nz) = self.config.size;
        let x = x.rem_euclid(nx as i32) as usize;
        let y = y.rem_euclid(ny as i32) as usize;
        let z = z.rem_euclid(nz as i32) as usize;
        self.index(x, y, z)
    }

    /// Advance the lattice by `dt` seconds.
    ///
    /// Semi-implicit Euler: accumulate forces, integrate velocity, then
    /// position, then damp. Displacement is hard-bounded: a point pushed
    /// past `max_offset` is pulled onto the bound and its velocity zeroed
    /// (clamp, not reflect), which keeps the system from exploding at any
    /// `dt` the clock can produce.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let (nx, ny, nz) = self.config.size;
        let cfg = self.config;

        // Pull toward rest position, growing superlinearly with distance.
        for (force, point) in self.forces.iter_mut().zip(&self.points) {
            *force = -point.offset * point.offset.length() * cfg.origin_pull;
        }

        // Neighbor springs, each walked once, accumulated into both ends.
        for z in 0..nz as i32 {
            for y in 0..ny as i32 {
                for x in 0..nx as i32 {
                    let i = self.index(x as usize, y as usize, z as usize);
                    for (off, rest) in &self.springs {
                        let j = self.wrapped_index(x + off.x, y + off.y, z + off.z);
                        // Separation includes the toroidal wrap offset: the
                        // neighbor sits one rest vector away regardless of
                        // which copy of the grid it lands in.
                        let sep =
                            off.as_vec3() + self.points[j].offset - self.points[i].offset;
                        let len = sep.length();
                        if len > 1e-6 {
                            let f = sep * ((len - rest) * cfg.stiffness / len);
                            self.forces[i] += f;
                            self.forces[j] -= f;
                        }
                    }
                }
            }
        }

        let retain = cfg.damping.powf(dt);
        for (point, force) in self.points.iter_mut().zip(&self.forces) {
            point.velocity += *force * dt;
            point.offset += point.velocity * dt;
            point.velocity *= retain;

            let len = point.offset.length();
            if len > cfg.max_offset {
                point.offset *= cfg.max_offset / len;
                point.velocity = Vec3::ZERO;
            }
        }
    }

    /// Sample the displacement field at fractional grid coordinates.
    ///
    /// Full trilinear interpolation over the 8 surrounding cells, wrapping
    /// on all three axes, so any finite position yields a value and the
    /// field is continuous across grid boundaries.
    pub fn sample(&self, pos: Vec3) -> Vec3 {
        let (nx, ny, nz) = self.config.size;
        let fx = pos.x.rem_euclid(nx as f32);
        let fy = pos.y.rem_euclid(ny as f32);
        let fz = pos.z.rem_euclid(nz as f32);

        let x0 = fx.floor() as i32;
        let y0 = fy.floor() as i32;
        let z0 = fz.floor() as i32;
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;
        let tz = fz - z0 as f32;

        let corner = |dx: i32, dy: i32, dz: i32| -> Vec3 {
            self.points[self.wrapped_index(x0 + dx, y0 + dy, z0 + dz)].offset
        };

        let lerp = |a: Vec3, b: Vec3, t: f32| a + (b - a) * t;

        let c00 = lerp(corner(0, 0, 0), corner(1, 0, 0), tx);
        let c10 = lerp(corner(0, 1, 0), corner(1, 1, 0), tx);
        let c01 = lerp(corner(0, 0, 1), corner(1, 0, 1), tx);
        let c11 = lerp(corner(0, 1, 1), corner(1, 1, 1), tx);
        let c0 = lerp(c00, c10, ty);
        let c1 = lerp(c01, c11, ty);
        lerp(c0, c1, tz)
    }

    /// Largest displacement magnitude currently in the grid.
    pub fn max_displacement(&self) -> f32 {
        self.points
            .iter()
            .map(|p| p.offset.length())
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_lattice(seed: u64) -> SpringLattice {
        SpringLattice::new(
            LatticeConfig {
                size: (4, 4, 4),
                ..Default::default()
            },
            seed,
        )
    }

    #[test]
    fn test_init_is_deterministic() {
        let a = small_lattice(7);
        let b = small_lattice(7);
        for (pa, pb) in a.points().iter().zip(b.points()) {
            assert_eq!(pa.offset, pb.offset);
        }
    }

    #[test]
    fn test_init_velocities_are_zero() {
        let lattice = small_lattice(0);
        assert!(lattice.points().iter().all(|p| p.velocity == Vec3::ZERO));
    }

    #[test]
    fn test_displacement_stays_bounded() {
        let mut lattice = small_lattice(0);
        let max = lattice.config().max_offset;
        for _ in 0..200 {
            lattice.step(1.0 / 60.0);
            assert!(lattice.max_displacement() <= max + 1e-4);
        }
    }

    #[test]
    fn test_extreme_dt_does_not_explode() {
        // A long stall produces one huge delta. The clamp must hold.
        let mut lattice = small_lattice(3);
        lattice.step(5.0);
        assert!(lattice.max_displacement() <= lattice.config().max_offset + 1e-4);
        assert!(lattice.points().iter().all(|p| p.offset.is_finite()));
    }

    #[test]
    fn test_sample_wraps_toroidally() {
        let lattice = small_lattice(11);
        let (nx, ny, nz) = lattice.size();
        let a = lattice.sample(Vec3::new(0.0, 1.3, 2.7));
        let b = lattice.sample(Vec3::new(nx as f32, 1.3, 2.7));
        assert!((a - b).length() < 1e-5);

        let c = lattice.sample(Vec3::new(1.5, -0.2, 0.9));
        let d = lattice.sample(Vec3::new(1.5, ny as f32 - 0.2, nz as f32 + 0.9));
        assert!((c - d).length() < 1e-5);
    }

    #[test]
    fn test_sample_interpolates_between_corners() {
        let lattice = small_lattice(5);
        let at_corner = lattice.sample(Vec3::new(1.0, 1.0, 1.0));
        let stored = lattice.points()[lattice.index(1, 1, 1)].offset;
        assert!((at_corner - stored).length() < 1e-5);
    }
}
