//! Instanced marker-sphere pipeline with Phong-style shading: ambient,
//! directional and point light terms plus a per-instance emissive tint.

use super::{MeshVertex, SphereInstance};
use crate::data::geometry::{self, SPHERE_RADIUS};
use crate::renderer::globals::GLOBALS_WGSL;
use wgpu::util::DeviceExt;

pub struct MeshPipeline {
    pipeline: wgpu::RenderPipeline,
    sphere_vb: wgpu::Buffer,
    sphere_ib: wgpu::Buffer,
    index_count: u32,
}

impl MeshPipeline {
    pub fn new(
        device: &wgpu::Device,
        color_fmt: wgpu::TextureFormat,
        depth_fmt: wgpu::TextureFormat,
        globals_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        // One shared unit sphere; every marker instances it.
        let mesh = geometry::uv_sphere(SPHERE_RADIUS, 16, 16);
        let vertices: Vec<MeshVertex> = mesh
            .positions
            .iter()
            .zip(&mesh.normals)
            .map(|(p, n)| MeshVertex {
                position: *p,
                normal: *n,
            })
            .collect();

        let sphere_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Mesh VB"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let sphere_ib = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Mesh IB"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sphere WGSL"),
            source: wgpu::ShaderSource::Wgsl(format!("{GLOBALS_WGSL}\n{SPHERE_WGSL}").into()),
        });

        let vbuf_layouts = [
            // Mesh vertex
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<MeshVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[
                    wgpu::VertexAttribute {
                        shader_location: 0,
                        offset: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    wgpu::VertexAttribute {
                        shader_location: 1,
                        offset: 12,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                ],
            },
            // Per-sphere instance
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<SphereInstance>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[
                    wgpu::VertexAttribute {
                        shader_location: 2,
                        offset: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    wgpu::VertexAttribute {
                        shader_location: 3,
                        offset: 12,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    wgpu::VertexAttribute {
                        shader_location: 4,
                        offset: 24,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                ],
            },
        ];

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sphere PipelineLayout"),
            bind_group_layouts: &[globals_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sphere Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &vbuf_layouts,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_fmt,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_fmt,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            pipeline,
            sphere_vb,
            sphere_ib,
            index_count: mesh.indices.len() as u32,
        }
    }

    pub fn draw<'a>(
        &'a self,
        rpass: &mut wgpu::RenderPass<'a>,
        instances: &'a wgpu::Buffer,
        count: u32,
    ) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_vertex_buffer(0, self.sphere_vb.slice(..));
        rpass.set_vertex_buffer(1, instances.slice(..));
        rpass.set_index_buffer(self.sphere_ib.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.index_count, 0, 0..count);
    }
}

const SPHERE_WGSL: &str = r#"
struct VSOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec3<f32>,
    @location(3) emissive: vec3<f32>,
}

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) center: vec3<f32>,
    @location(3) color: vec3<f32>,
    @location(4) emissive: vec3<f32>,
) -> VSOut {
    let world = position + center;
    var out: VSOut;
    out.clip = G.view_proj * vec4<f32>(world, 1.0);
    out.world_pos = world;
    out.normal = normal;
    out.color = color;
    out.emissive = emissive;
    return out;
}

@fragment
fn fs_main(in: VSOut) -> @location(0) vec4<f32> {
    let n = normalize(in.normal);
    let view_dir = normalize(G.camera_pos - in.world_pos);

    var lit = G.ambient_color * G.ambient_intensity * in.color;

    // Directional light: diffuse plus a Blinn specular lobe, shininess 30.
    let l = normalize(G.dir_direction);
    let ndl = max(dot(n, l), 0.0);
    lit += G.dir_color * G.dir_intensity * ndl * in.color;
    let h = normalize(l + view_dir);
    lit += G.dir_color * G.dir_intensity * pow(max(dot(n, h), 0.0), 30.0) * 0.25;

    // Point light with linear range falloff.
    let to_light = G.point_light_pos - in.world_pos;
    let dist = length(to_light);
    let atten = clamp(1.0 - dist / G.point_light_range, 0.0, 1.0);
    let lp = to_light / max(dist, 1e-4);
    lit += G.point_light_color * G.point_light_intensity * atten * max(dot(n, lp), 0.0) * in.color;

    lit += in.emissive;
    return vec4<f32>(lit, 1.0);
}
"#;
