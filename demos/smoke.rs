//! Smoke plume with a dense particle pool and strong field warp.
//!
//! Run with: cargo run --example smoke

use winit::event_loop::{ControlFlow, EventLoop};

use plume::prelude::*;

fn main() {
    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Poll);

    let settings = Settings::new()
        .with("particle_count", 4096)
        .with("lifetime", 2.5)
        .with("lattice_size", 12)
        .with("warp", 3.2)
        .with("roll_speed", 0.15)
        .with("seed", 7);

    let mut app = PreviewApp::new(Box::new(SmokeEffect::new()), settings, "plume - smoke");
    event_loop.run_app(&mut app).unwrap();
}
