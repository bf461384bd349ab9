mod config;
mod constants;
mod field;
mod renderer;
mod simulation;

use crate::constants::{FIELD_HEIGHT, FIELD_WIDTH, FPS_UPDATE_INTERVAL_SECS, MAX_WALKERS};
use crate::renderer::Renderer;
use crate::simulation::{SimulationState, StepReport};
use std::{sync::Arc, time::Instant};
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let event_loop = EventLoop::new()?;
    // The field is sized to the window and never resized, so the window is
    // fixed; one simulation tick runs per frame.
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("substrate")
            .with_inner_size(PhysicalSize::new(FIELD_WIDTH, FIELD_HEIGHT))
            .with_resizable(false)
            .build(&event_loop)?,
    );
    let mut simulation = SimulationState::new(FIELD_WIDTH, FIELD_HEIGHT);
    let mut renderer = pollster::block_on(Renderer::new(window.clone(), simulation.dimensions()));

    let mut last_fps_update_time = Instant::now();
    let mut frames_since_last_fps_update = 0;
    let mut current_fps = 0.0;

    event_loop.run(move |event, elwt: &EventLoopWindowTarget<()>| {
        elwt.set_control_flow(ControlFlow::Poll);
        match event {
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(physical_size) => {
                    renderer.resize(physical_size);
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    renderer.resize(window.inner_size());
                }
                WindowEvent::KeyboardInput {
                    event: key_event, ..
                } => {
                    if key_event.state == ElementState::Pressed && !key_event.repeat {
                        match key_event.physical_key {
                            PhysicalKey::Code(KeyCode::Space) => simulation.toggle_pause(),
                            PhysicalKey::Code(KeyCode::KeyR) => simulation.restart(),
                            PhysicalKey::Code(KeyCode::Escape) => elwt.exit(),
                            _ => {}
                        }
                    }
                }
                WindowEvent::RedrawRequested => {
                    let report = match simulation.step() {
                        Ok(report) => report,
                        Err(err) => {
                            log::error!("Simulation step failed: {err}");
                            StepReport { regenerated: false }
                        }
                    };
                    match renderer.render(&simulation, report.regenerated) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("WGPU Error: OutOfMemory");
                            elwt.exit();
                        }
                        Err(e) => log::warn!("WGPU Error: {:?}", e),
                    }

                    frames_since_last_fps_update += 1;
                    let now = Instant::now();
                    let elapsed_secs = now.duration_since(last_fps_update_time).as_secs_f64();
                    if elapsed_secs >= FPS_UPDATE_INTERVAL_SECS {
                        current_fps = frames_since_last_fps_update as f64 / elapsed_secs;
                        last_fps_update_time = now;
                        frames_since_last_fps_update = 0;
                        let paused_text = if simulation.is_paused() {
                            " [PAUSED]"
                        } else {
                            ""
                        };
                        window.set_title(&format!(
                            "substrate - walkers: {}/{} - tick: {} - FPS: {:.1}{}",
                            simulation.walkers.len(),
                            MAX_WALKERS,
                            simulation.iteration(),
                            current_fps,
                            paused_text
                        ));
                    }
                }
                _ => {}
            },
            _ => {}
        }
    })?;
    Ok(())
}
