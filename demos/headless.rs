//! Headless run: drive the smoke effect at a fixed timestep without a
//! window and print per-second stats. Useful for profiling the simulation
//! on machines without a GPU.
//!
//! Run with: cargo run --example headless

use std::time::Instant;

use plume::prelude::*;

fn main() {
    let settings = Settings::new()
        .with("particle_count", 8192)
        .with("lattice_size", 16)
        .with("seed", 1);

    let mut driver = EffectDriver::new(SmokeEffect::new());
    driver.start(&settings).expect("settings are valid");
    driver.clock_mut().set_fixed_delta(Some(1.0 / 60.0));

    let viewport = Viewport::new(1280.0, 720.0);
    let mut mesh = FrameMesh::new();

    let started = Instant::now();
    for second in 1..=10 {
        for _ in 0..60 {
            driver.render_frame(viewport, &mut mesh);
        }
        println!(
            "t={:>2}s  live={:>5}  quads={:>5}  wall={:.2}s",
            second,
            driver.effect().live_count(),
            mesh.indices().len() / 6,
            started.elapsed().as_secs_f32()
        );
    }

    driver.stop();
}
