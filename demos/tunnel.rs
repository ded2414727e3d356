//! Endless tunnel of swaying depth planes.
//!
//! Run with: cargo run --example tunnel

use winit::event_loop::{ControlFlow, EventLoop};

use plume::prelude::*;

fn main() {
    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Poll);

    let settings = Settings::new()
        .with("plane_count", 48)
        .with("ring_points", 32)
        .with("speed", 7.0)
        .with("hole_radius", 2.2)
        .with("seed", 3);

    let mut app = PreviewApp::new(Box::new(TunnelEffect::new()), settings, "plume - tunnel");
    event_loop.run_app(&mut app).unwrap();
}
