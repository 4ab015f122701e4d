//! Entry point for the point cloud viewer.

use anyhow::Result;
use clap::Parser;
use cloudview::{app::App, config::Args, error::ViewerError, net};
use std::sync::Arc;
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

fn main() -> Result<()> {
    // Initialize logging; default to "info" if RUST_LOG is unset.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.viewer_config();
    let options = args.visualize_options();

    // Create the event loop and window.
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Point Cloud Viewer")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
            .build(&event_loop)
            .map_err(|e| ViewerError::Config(format!("window creation failed: {e}")))?,
    );

    // Initialise the application (async → sync). Without a renderer there is
    // nowhere to draw the error overlay, so render failures go to stderr.
    let mut app = match pollster::block_on(App::new(window.clone(), &config, options)) {
        Ok(app) => app,
        Err(err) => {
            log::error!("{err}");
            if err.is_render_related() {
                eprintln!("3D rendering is not supported in this environment.");
                eprintln!("Please try:");
                eprintln!("  - Updating your graphics drivers");
                eprintln!("  - Checking that Vulkan, Metal or DirectX 12 is available");
                eprintln!("  - Running on a machine with a supported GPU");
            }
            return Err(err.into());
        }
    };

    // Kick the dataset fetch off on its own thread; the viewer renders its
    // loading overlay until the result lands, then switches to the HUD or
    // the error overlay.
    let (tx, rx) = crossbeam_channel::bounded(1);
    net::spawn_fetch(args.url.clone(), tx);
    app.await_dataset(rx);

    // Run the winit event loop.
    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => {
                if !app.handle_event(&window, &event) {
                    match event {
                        WindowEvent::CloseRequested => {
                            app.cleanup();
                            elwt.exit();
                        }
                        WindowEvent::KeyboardInput { event, .. } => {
                            if event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                                app.cleanup();
                                elwt.exit();
                            }
                        }
                        WindowEvent::RedrawRequested => match app.render(&window) {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost) => {
                                app.resize(app.renderer.gfx.size);
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                log::error!("WGPU out of memory – exiting.");
                                app.cleanup();
                                elwt.exit();
                            }
                            Err(e) => log::error!("Render error: {:?}", e),
                        },
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                // Request a redraw each frame.
                window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
