use winit::event_loop::{ControlFlow, EventLoop};

use plume::prelude::*;

fn main() {
    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Poll);

    let settings = Settings::new();
    let mut app = PreviewApp::new(Box::new(SmokeEffect::new()), settings, "plume");
    event_loop.run_app(&mut app).unwrap();
}
