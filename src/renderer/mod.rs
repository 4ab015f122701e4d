//! wgpu renderer for the point cloud scene.
//!
//! The renderer keeps a GPU-side cache keyed by scene node id. `prepare`
//! compares the scene's generation counter against the one it last uploaded
//! and resynchronizes residency only when membership actually changed;
//! per-frame work is then limited to one uniform upload and the draw calls.

pub mod context;
pub mod globals;
pub mod pipelines;
pub mod targets;

use crate::camera::OrbitCamera;
use crate::error::ViewerError;
use crate::scene::{NodeId, NodeKind, Scene};
use context::GfxContext;
use globals::Globals;
use pipelines::lines::LinePipeline;
use pipelines::mesh::MeshPipeline;
use pipelines::points::PointsPipeline;
use pipelines::{LineVertex, PointInstance, SphereInstance};
use std::collections::HashMap;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

enum GpuNode {
    Points { buffer: wgpu::Buffer, count: u32 },
    Lines { buffer: wgpu::Buffer, count: u32, strip: bool },
}

pub struct Renderer {
    pub gfx: GfxContext,
    depth: targets::DepthTarget,
    globals: Globals,
    points: PointsPipeline,
    mesh: MeshPipeline,
    lines: LinePipeline,
    /// egui pass for the HUD and error overlay; driven by the app.
    pub egui_renderer: egui_wgpu::Renderer,
    cache: HashMap<NodeId, GpuNode>,
    /// All sphere markers collapse into one instanced draw.
    sphere_instances: Option<(wgpu::Buffer, u32)>,
    uploaded_generation: Option<u64>,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, max_pixel_ratio: f32) -> Result<Self, ViewerError> {
        let gfx = GfxContext::new(window, max_pixel_ratio).await?;
        let depth = targets::DepthTarget::new(&gfx.device, gfx.config.width, gfx.config.height);
        let globals = Globals::new(&gfx.device);

        let points = PointsPipeline::new(&gfx.device, gfx.config.format, depth.format, &globals.layout);
        let mesh = MeshPipeline::new(&gfx.device, gfx.config.format, depth.format, &globals.layout);
        let lines = LinePipeline::new(&gfx.device, gfx.config.format, depth.format, &globals.layout);

        let egui_renderer = egui_wgpu::Renderer::new(&gfx.device, gfx.config.format, None, 1);

        Ok(Self {
            gfx,
            depth,
            globals,
            points,
            mesh,
            lines,
            egui_renderer,
            cache: HashMap::new(),
            sphere_instances: None,
            uploaded_generation: None,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.gfx.resize(new_size);
        self.depth
            .resize(&self.gfx.device, self.gfx.config.width, self.gfx.config.height);
    }

    /// Synchronizes GPU residency with the scene. Cheap when nothing changed.
    pub fn prepare(&mut self, scene: &Scene) {
        if self.uploaded_generation == Some(scene.generation()) {
            return;
        }

        self.cache.retain(|id, _| scene.contains(*id));

        let mut spheres: Vec<SphereInstance> = Vec::new();
        for node in scene.nodes() {
            match &node.kind {
                NodeKind::Sphere(marker) => spheres.push(SphereInstance {
                    center: marker.center,
                    color: marker.color,
                    emissive: marker.emissive,
                }),
                NodeKind::Points(geo) => {
                    if !self.cache.contains_key(&node.id) {
                        let instances: Vec<PointInstance> = geo
                            .positions
                            .iter()
                            .zip(&geo.colors)
                            .map(|(p, c)| PointInstance {
                                position: *p,
                                color: *c,
                            })
                            .collect();
                        let buffer =
                            self.gfx
                                .device
                                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                                    label: Some("Point Cloud Instances"),
                                    contents: bytemuck::cast_slice(&instances),
                                    usage: wgpu::BufferUsages::VERTEX,
                                });
                        self.cache.insert(
                            node.id,
                            GpuNode::Points {
                                buffer,
                                count: instances.len() as u32,
                            },
                        );
                    }
                }
                NodeKind::Lines(geo) => {
                    if !self.cache.contains_key(&node.id) {
                        let vertices: Vec<LineVertex> = geo
                            .positions
                            .iter()
                            .zip(&geo.colors)
                            .map(|(p, c)| LineVertex {
                                position: *p,
                                color: *c,
                            })
                            .collect();
                        let buffer =
                            self.gfx
                                .device
                                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                                    label: Some("Line Vertices"),
                                    contents: bytemuck::cast_slice(&vertices),
                                    usage: wgpu::BufferUsages::VERTEX,
                                });
                        self.cache.insert(
                            node.id,
                            GpuNode::Lines {
                                buffer,
                                count: vertices.len() as u32,
                                strip: geo.strip,
                            },
                        );
                    }
                }
            }
        }

        self.sphere_instances = if spheres.is_empty() {
            None
        } else {
            let buffer = self
                .gfx
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Sphere Instances"),
                    contents: bytemuck::cast_slice(&spheres),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            Some((buffer, spheres.len() as u32))
        };

        self.uploaded_generation = Some(scene.generation());
    }

    /// Records and submits the scene pass. `draw_scene` false still clears
    /// the frame to the background color so overlays composite onto it.
    pub fn render_scene(
        &mut self,
        view: &wgpu::TextureView,
        scene: &Scene,
        camera: &OrbitCamera,
        draw_scene: bool,
    ) {
        self.globals.update(&self.gfx.queue, camera, scene.lights);

        let [r, g, b] = scene.background;
        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if draw_scene {
                rpass.set_bind_group(0, &self.globals.bind_group, &[]);

                // Opaque spheres first, then helper lines, additive points
                // last so their blending sees the final opaque depth.
                if let Some((buffer, count)) = &self.sphere_instances {
                    self.mesh.draw(&mut rpass, buffer, *count);
                }
                for node in self.cache.values() {
                    if let GpuNode::Lines { buffer, count, strip } = node {
                        self.lines.draw(&mut rpass, buffer, *count, *strip);
                    }
                }
                for node in self.cache.values() {
                    if let GpuNode::Points { buffer, count } = node {
                        self.points.draw(&mut rpass, buffer, *count);
                    }
                }
            }
        }

        self.gfx.queue.submit(Some(encoder.finish()));
    }

    /// Releases all cached geometry. Idempotent; the next `prepare` call
    /// rebuilds residency from the scene.
    pub fn dispose(&mut self) {
        self.cache.clear();
        self.sphere_instances = None;
        self.uploaded_generation = None;
    }
}
