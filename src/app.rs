use crate::{
    animation::{is_low_fps, FrameStats},
    camera::{OrbitCamera, OrbitControls},
    config::{ViewerConfig, VisualizeOptions},
    data::types::Point3,
    error::ViewerError,
    net::{self, FetchResult},
    renderer::Renderer,
    resize::{aspect_of, ResizeCoordinator},
    scene::{GeometryBatch, Scene},
    ui,
    visualize::Visualizer,
};
use crossbeam_channel::Receiver;
use std::sync::Arc;
use std::time::Instant;
use winit::{event::WindowEvent, window::Window};

/// What the overlay should show this frame.
enum Phase {
    Loading,
    Ready { point_count: usize },
    Failed { message: String, render_related: bool },
}

pub struct App {
    pub renderer: Renderer,
    pub scene: Scene,
    pub camera: OrbitCamera,
    pub controls: OrbitControls,
    options: VisualizeOptions,
    resize: ResizeCoordinator,
    stats: FrameStats,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    /// Handles from the last visualization pass, removed before the next one.
    batch: Option<GeometryBatch>,
    /// Present while a dataset fetch is in flight.
    fetch_rx: Option<Receiver<FetchResult>>,
    phase: Phase,
}

impl App {
    pub async fn new(
        window: Arc<Window>,
        config: &ViewerConfig,
        options: VisualizeOptions,
    ) -> Result<Self, ViewerError> {
        let renderer = Renderer::new(window.clone(), config.max_pixel_ratio).await?;

        let mut scene = Scene::new(config.background_color);
        scene.add_lights();
        scene.add_helpers(config);

        let camera = OrbitCamera::new(aspect_of(renderer.gfx.size));
        let controls = OrbitControls::new();

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            None,
        );

        Ok(Self {
            renderer,
            scene,
            camera,
            controls,
            options,
            resize: ResizeCoordinator::new(),
            stats: FrameStats::new(Instant::now()),
            egui_ctx,
            egui_state,
            batch: None,
            fetch_rx: None,
            phase: Phase::Loading,
        })
    }

    /// Arms the app to consume a fetch already in flight; the loading
    /// overlay shows until the result lands.
    pub fn await_dataset(&mut self, rx: Receiver<FetchResult>) {
        self.fetch_rx = Some(rx);
        self.phase = Phase::Loading;
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.renderer.resize(new_size);
        self.camera.set_aspect(aspect_of(new_size));
    }

    /// Routes a window event. Returns true when the event was consumed by
    /// the overlay and should go no further.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        if response.consumed {
            return true;
        }

        self.controls.handle_event(event);

        match event {
            // Observed size change: resize immediately, no debounce.
            WindowEvent::Resized(physical_size) => {
                if let Some(size) = self.resize.observe(*physical_size) {
                    self.resize(size);
                }
            }
            // Monitor scale changes arrive without a matching Resized event
            // on some platforms, so fall back to the debounced path. The
            // size is read when the debounce fires, not here: the window may
            // still report the pre-change dimensions at this point.
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.renderer.gfx.set_scale_factor(*scale_factor);
                self.resize.schedule(Instant::now());
            }
            _ => {}
        }

        false
    }

    /// Replaces the current dataset geometry with a fresh visualization pass.
    pub fn show_dataset(&mut self, data: &[Point3]) {
        if let Some(batch) = self.batch.take() {
            self.scene.remove_batch(&batch);
        }
        let batch = Visualizer::new(&mut self.scene).visualize(data, &self.options);
        self.batch = Some(batch);
        self.phase = Phase::Ready {
            point_count: data.len(),
        };
        self.stats.restart(Instant::now());
    }

    /// Switches the overlay to the error panel.
    pub fn fail(&mut self, error: &ViewerError) {
        log::error!("{error}");
        self.phase = Phase::Failed {
            message: error.to_string(),
            render_related: error.is_render_related(),
        };
    }

    /// Releases scene and GPU residency. Safe to call more than once.
    pub fn cleanup(&mut self) {
        if let Some(batch) = self.batch.take() {
            self.scene.remove_batch(&batch);
        }
        self.scene.clear();
        self.renderer.dispose();
        self.resize.disconnect();
        self.fetch_rx = None;
    }

    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        // A fetch in flight resolves here; until then the loading overlay
        // stays up.
        if let Some(rx) = &self.fetch_rx {
            if let Some(result) = net::poll_fetch(rx) {
                self.fetch_rx = None;
                match result {
                    Ok(data) => self.show_dataset(&data),
                    Err(err) => self.fail(&err),
                }
            }
        }

        // Debounced fallback resizes fire from the frame loop, applying the
        // dimensions current at fire time.
        if self.resize.poll(Instant::now()) {
            if let Some(size) = self.resize.observe(window.inner_size()) {
                self.resize(size);
            }
        }

        self.controls.update(&mut self.camera);

        if let Some(fps) = self.stats.on_frame(Instant::now()) {
            if is_low_fps(fps) {
                log::warn!("Low FPS detected: {fps}");
            }
        }

        self.renderer.prepare(&self.scene);

        let frame = self.renderer.gfx.surface.get_current_texture()?;
        let swap_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let draw_scene = !matches!(self.phase, Phase::Failed { .. });
        self.renderer
            .render_scene(&swap_view, &self.scene, &self.camera, draw_scene);

        let egui_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(egui_input);

        match &self.phase {
            Phase::Loading => ui::draw_loading(&self.egui_ctx),
            Phase::Ready { point_count } => {
                let fps = match self.stats.fps() {
                    0 => None,
                    f => Some(f),
                };
                ui::draw_hud(&self.egui_ctx, fps, *point_count);
            }
            Phase::Failed {
                message,
                render_related,
            } => ui::draw_error(&self.egui_ctx, message, *render_related),
        }

        let egui_output = self.egui_ctx.end_frame();
        let shapes = self
            .egui_ctx
            .tessellate(egui_output.shapes, self.egui_ctx.pixels_per_point());

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                self.renderer.gfx.config.width,
                self.renderer.gfx.config.height,
            ],
            pixels_per_point: self.egui_ctx.pixels_per_point(),
        };

        let mut encoder = self
            .renderer
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("UI Encoder"),
            });

        for (id, delta) in &egui_output.textures_delta.set {
            self.renderer.egui_renderer.update_texture(
                &self.renderer.gfx.device,
                &self.renderer.gfx.queue,
                *id,
                delta,
            );
        }

        self.renderer.egui_renderer.update_buffers(
            &self.renderer.gfx.device,
            &self.renderer.gfx.queue,
            &mut encoder,
            &shapes,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("EGUI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer
                .egui_renderer
                .render(&mut render_pass, &shapes, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.renderer.egui_renderer.free_texture(id);
        }

        self.renderer
            .gfx
            .queue
            .submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }
}
