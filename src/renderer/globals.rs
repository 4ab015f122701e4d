//! Per-frame uniform shared by every scene pipeline.

use crate::camera::OrbitCamera;
use crate::data::geometry::{POINT_OPACITY, POINT_SIZE};
use crate::scene::LightRig;

/// std140 layout; must match the `Globals` struct in each WGSL shader.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Camera right axis, for billboarding point sprites.
    pub cam_right: [f32; 3],
    pub point_size: f32,
    /// Camera up axis.
    pub cam_up: [f32; 3],
    pub point_opacity: f32,
    pub camera_pos: [f32; 3],
    pub _pad0: f32,
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    /// Unit vector toward the directional light.
    pub dir_direction: [f32; 3],
    pub dir_intensity: f32,
    pub dir_color: [f32; 3],
    pub _pad1: f32,
    pub point_light_pos: [f32; 3],
    pub point_light_intensity: f32,
    pub point_light_color: [f32; 3],
    pub point_light_range: f32,
}

// Compile-time safety check: buffer size must match the WGSL-reflected size.
const _: [(); 192] = [(); core::mem::size_of::<FrameUniform>()];

/// WGSL declaration shared by the scene shaders, bound at group 0.
pub const GLOBALS_WGSL: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    cam_right: vec3<f32>,
    point_size: f32,
    cam_up: vec3<f32>,
    point_opacity: f32,
    camera_pos: vec3<f32>,
    _pad0: f32,
    ambient_color: vec3<f32>,
    ambient_intensity: f32,
    dir_direction: vec3<f32>,
    dir_intensity: f32,
    dir_color: vec3<f32>,
    _pad1: f32,
    point_light_pos: vec3<f32>,
    point_light_intensity: f32,
    point_light_color: vec3<f32>,
    point_light_range: f32,
};
@group(0) @binding(0) var<uniform> G: Globals;
"#;

pub struct Globals {
    pub layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
    buffer: wgpu::Buffer,
}

impl Globals {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<FrameUniform>() as u64
                    ),
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Uniform Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            layout,
            bind_group,
            buffer,
        }
    }

    /// Uploads the current camera and light state for this frame.
    pub fn update(&self, queue: &wgpu::Queue, camera: &OrbitCamera, lights: Option<LightRig>) {
        let uniform = build_frame_uniform(camera, lights);
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&uniform));
    }
}

pub fn build_frame_uniform(camera: &OrbitCamera, lights: Option<LightRig>) -> FrameUniform {
    let (right, up) = camera.basis();
    let rig = lights.unwrap_or(LightRig {
        ambient_color: [0.0; 3],
        ambient_intensity: 0.0,
        directional_color: [0.0; 3],
        directional_intensity: 0.0,
        directional_position: [0.0, 1.0, 0.0],
        point_color: [0.0; 3],
        point_intensity: 0.0,
        point_position: [0.0; 3],
        point_range: 1.0,
    });

    let dir = glam::Vec3::from(rig.directional_position).normalize_or_zero();

    FrameUniform {
        view_proj: camera.view_proj().to_cols_array_2d(),
        cam_right: right.to_array(),
        point_size: POINT_SIZE,
        cam_up: up.to_array(),
        point_opacity: POINT_OPACITY,
        camera_pos: camera.position().to_array(),
        _pad0: 0.0,
        ambient_color: rig.ambient_color,
        ambient_intensity: rig.ambient_intensity,
        dir_direction: dir.to_array(),
        dir_intensity: rig.directional_intensity,
        dir_color: rig.directional_color,
        _pad1: 0.0,
        point_light_pos: rig.point_position,
        point_light_intensity: rig.point_intensity,
        point_light_color: rig.point_color,
        point_light_range: rig.point_range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn uniform_carries_the_light_rig() {
        let camera = OrbitCamera::new(1.0);
        let uniform = build_frame_uniform(&camera, Some(LightRig::default()));
        assert_eq!(uniform.point_light_range, 50.0);
        assert_eq!(uniform.dir_color, [1.0, 1.0, 1.0]);
        // (5,5,5) normalized.
        let c = 1.0 / 3f32.sqrt();
        for axis in uniform.dir_direction {
            assert_relative_eq!(axis, c, epsilon = 1e-6);
        }
        assert_eq!(uniform.point_size, POINT_SIZE);
    }

    #[test]
    fn missing_rig_renders_unlit() {
        let camera = OrbitCamera::new(1.0);
        let uniform = build_frame_uniform(&camera, None);
        assert_eq!(uniform.ambient_intensity, 0.0);
        assert_eq!(uniform.dir_intensity, 0.0);
    }
}
