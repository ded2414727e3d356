//! # Plume - Procedural Smoke & Tunnel Effects
//!
//! CPU-simulated, GPU-drawn particle effects built around a damped
//! mass-spring lattice.
//!
//! Plume keeps the simulation on the CPU where it is easy to test and
//! reason about, and hands the GPU a flat list of textured quads once per
//! frame. Two effects ship with the crate: a smoke plume whose particles
//! drift through a toroidal spring lattice, and an endless tunnel of
//! swaying depth planes with closed-form visibility culling.
//!
//! ## Quick Start
//!
//! ```ignore
//! use plume::prelude::*;
//!
//! fn main() {
//!     let settings = Settings::new()
//!         .with("particle_count", 4096)
//!         .with("lifetime", 2.5)
//!         .with("warp", 3.0);
//!
//!     let mut app = PreviewApp::new(Box::new(SmokeEffect::new()), settings, "smoke");
//!     let event_loop = winit::event_loop::EventLoop::new().unwrap();
//!     event_loop.run_app(&mut app).unwrap();
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Effects
//!
//! An [`Effect`](lifecycle::Effect) is a `start`/`stop`/`render` state
//! machine. `start` reads [`Settings`](settings::Settings) and allocates;
//! `render` fills a [`FrameMesh`](render::FrameMesh) with billboards or
//! ring strips; `stop` releases everything. The
//! [`EffectDriver`](lifecycle::EffectDriver) enforces the contract: a
//! stopped effect never renders, and `start`/`stop` are idempotent.
//!
//! ### The spring lattice
//!
//! [`SpringLattice`](field::SpringLattice) is a 3D grid of point masses
//! joined to their 26 neighbors by damped springs, wrapped toroidally so
//! the field is defined everywhere. Particles sample its displacement
//! field with trilinear interpolation and drift along it.
//!
//! ### Projection and culling
//!
//! [`Camera`](camera::Camera) does pinhole projection along +Y.
//! The tunnel effect bounds each depth plane's projected hole with a
//! closed-form line/unit-circle solve and stops drawing at the first
//! plane whose bound no longer intersects the screen.
//!
//! ## Module Overview
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`field`] | Damped mass-spring lattice and trilinear sampler |
//! | [`emitter`] | Fixed-capacity particle pool with interval spawning |
//! | [`camera`] | Pinhole projection, viewport, screen rectangles |
//! | [`tunnel`] | Depth-plane ring and projected-circle culling |
//! | [`render`] | CPU-side mesh assembly (billboards, ring strips) |
//! | [`lifecycle`] | The `Effect` trait and its driver |
//! | [`effects`] | The shipped smoke and tunnel effects |
//! | [`settings`] | Key-value configuration read at `start()` |
//! | [`window`] | winit/wgpu preview host |

pub mod camera;
pub mod effects;
pub mod emitter;
pub mod error;
pub mod field;
pub mod lifecycle;
pub mod render;
pub mod settings;
mod shader;
pub mod time;
pub mod tunnel;
pub mod window;

pub use bytemuck;
pub use camera::{Camera, Rect, ScreenPoint, Viewport};
pub use effects::{SmokeEffect, TunnelEffect};
pub use emitter::{EmitterConfig, ParticlePool};
pub use error::{EffectError, GpuError};
pub use field::{LatticeConfig, SpringLattice};
pub use glam::{Vec2, Vec3, Vec4};
pub use lifecycle::{Effect, EffectDriver, FrameContext};
pub use render::{FrameMesh, Vertex};
pub use settings::{Settings, Value};
pub use tunnel::{PlaneRing, RingConfig};
pub use window::PreviewApp;

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use plume::prelude::*;
/// ```
pub mod prelude {
    pub use crate::camera::{Camera, Viewport};
    pub use crate::effects::{SmokeEffect, TunnelEffect};
    pub use crate::error::EffectError;
    pub use crate::lifecycle::{Effect, EffectDriver, FrameContext};
    pub use crate::render::FrameMesh;
    pub use crate::settings::Settings;
    pub use crate::window::PreviewApp;
    pub use crate::{Vec2, Vec3, Vec4};
}
