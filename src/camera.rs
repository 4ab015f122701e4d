//! Perspective orbit camera and its input controller.

use glam::{Mat3, Mat4, Vec3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Vertical field of view, radians.
pub const FOV_Y: f32 = 75.0 * std::f32::consts::PI / 180.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 1000.0;

/// Default eye position, offset symmetrically from the origin so the whole
/// dataset region is in view at startup.
pub const DEFAULT_EYE: Vec3 = Vec3::new(10.0, 10.0, 10.0);

// Keep the orbit off the poles so the view basis never degenerates.
const ELEVATION_LIMIT: f32 = 89.0 * std::f32::consts::PI / 180.0;

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Pivot the camera orbits around.
    pub target: Vec3,
    /// Distance from the camera to the target.
    pub radius: f32,
    /// Angle around the Y axis, radians.
    pub azimuth: f32,
    /// Angle above the XZ plane, radians.
    pub elevation: f32,
    pub aspect: f32,
    proj: Mat4,
}

impl OrbitCamera {
    /// Camera at the default eye offset, looking at the origin.
    pub fn new(aspect: f32) -> Self {
        let offset = DEFAULT_EYE;
        let radius = offset.length();
        let elevation = (offset.y / radius).asin();
        let azimuth = offset.x.atan2(offset.z);
        Self {
            target: Vec3::ZERO,
            radius,
            azimuth,
            elevation,
            aspect,
            proj: Mat4::perspective_rh(FOV_Y, aspect, NEAR_PLANE, FAR_PLANE),
        }
    }

    /// Recomputes the projection for a new aspect ratio. Must run before the
    /// render that follows any resize.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.proj = Mat4::perspective_rh(FOV_Y, aspect, NEAR_PLANE, FAR_PLANE);
    }

    /// Eye position derived from the orbital parameters.
    pub fn position(&self) -> Vec3 {
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let (sin_el, cos_el) = self.elevation.sin_cos();
        self.target + self.radius * Vec3::new(cos_el * sin_az, sin_el, cos_el * cos_az)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// glam's `perspective_rh` already produces 0..1 clip depth, so no
    /// GL-to-WGPU conversion is needed here.
    pub fn view_proj(&self) -> Mat4 {
        self.proj * self.view_matrix()
    }

    /// Camera-space right and up axes in world space, for billboarding.
    pub fn basis(&self) -> (Vec3, Vec3) {
        let view = Mat3::from_mat4(self.view_matrix());
        let inv = view.transpose();
        (inv.x_axis, inv.y_axis)
    }
}

/// Orbit-style controls with damped inertia, tuned for latency-tolerant
/// interaction. Events accumulate deltas; `update` applies them once per
/// frame and lets the remainder decay.
pub struct OrbitControls {
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    rotating: bool,
    panning: bool,
    last_cursor: Option<(f64, f64)>,
    rotate_delta: (f32, f32),
    pan_delta: (f32, f32),
    zoom_scale: f32,
}

impl OrbitControls {
    pub fn new() -> Self {
        Self {
            damping_factor: 0.1,
            rotate_speed: 0.5,
            zoom_speed: 1.0,
            pan_speed: 0.8,
            min_distance: 5.0,
            max_distance: 50.0,
            rotating: false,
            panning: false,
            last_cursor: None,
            rotate_delta: (0.0, 0.0),
            pan_delta: (0.0, 0.0),
            zoom_scale: 1.0,
        }
    }

    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput { button, state, .. } => {
                self.on_button(*button, *state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.on_cursor(position.x, position.y);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
                };
                self.on_scroll(scroll);
            }
            _ => {}
        }
    }

    fn on_button(&mut self, button: MouseButton, pressed: bool) {
        match button {
            MouseButton::Left => self.rotating = pressed,
            MouseButton::Right => self.panning = pressed,
            _ => {}
        }
    }

    fn on_cursor(&mut self, x: f64, y: f64) {
        if let Some((lx, ly)) = self.last_cursor {
            let dx = (x - lx) as f32;
            let dy = (y - ly) as f32;
            if self.rotating {
                self.rotate_delta.0 += dx * 0.005 * self.rotate_speed;
                self.rotate_delta.1 += dy * 0.005 * self.rotate_speed;
            } else if self.panning {
                self.pan_delta.0 += dx * 0.002 * self.pan_speed;
                self.pan_delta.1 += dy * 0.002 * self.pan_speed;
            }
        }
        self.last_cursor = Some((x, y));
    }

    fn on_scroll(&mut self, scroll: f32) {
        // Scroll up zooms in (shrinks the radius).
        self.zoom_scale *= 1.1f32.powf(-scroll * self.zoom_speed);
    }

    /// Advances the damping state and applies pending motion to the camera.
    /// Called unconditionally once per animation tick.
    pub fn update(&mut self, camera: &mut OrbitCamera) {
        camera.azimuth -= self.rotate_delta.0;
        camera.elevation = (camera.elevation + self.rotate_delta.1)
            .clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);

        camera.radius = (camera.radius * self.zoom_scale).clamp(self.min_distance, self.max_distance);

        if self.pan_delta != (0.0, 0.0) {
            let (right, up) = camera.basis();
            let scale = camera.radius;
            camera.target += (-right * self.pan_delta.0 + up * self.pan_delta.1) * scale;
        }

        // Damped inertia: most of each delta carries into the next frame.
        let keep = 1.0 - self.damping_factor;
        self.rotate_delta.0 *= keep;
        self.rotate_delta.1 *= keep;
        self.pan_delta.0 *= keep;
        self.pan_delta.1 *= keep;
        self.zoom_scale = 1.0 + (self.zoom_scale - 1.0) * keep;
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new()
    }
}
