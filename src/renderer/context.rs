//! GPU context bound to the viewer window.

use crate::capability;
use crate::error::ViewerError;
use std::sync::Arc;
use winit::dpi::PhysicalSize;
use winit::window::Window;

/// Drawing-buffer dimensions after capping the device pixel ratio. On
/// displays whose scale factor exceeds the cap, the buffer shrinks
/// proportionally to bound GPU cost; layout size is untouched.
pub fn capped_surface_size(
    size: PhysicalSize<u32>,
    scale_factor: f64,
    max_pixel_ratio: f32,
) -> PhysicalSize<u32> {
    let max_ratio = max_pixel_ratio.max(0.1) as f64;
    if scale_factor <= max_ratio {
        return size;
    }
    let shrink = max_ratio / scale_factor;
    PhysicalSize::new(
        ((size.width as f64 * shrink) as u32).max(1),
        ((size.height as f64 * shrink) as u32).max(1),
    )
}

/// Holds all GPU resources needed for rendering.
pub struct GfxContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    /// Requested (window) size; the drawing buffer may be smaller when the
    /// pixel-ratio cap bites.
    pub size: PhysicalSize<u32>,
    scale_factor: f64,
    max_pixel_ratio: f32,
}

impl GfxContext {
    /// Creates a new graphics context mounted on the given window. Fails
    /// with a render error when the capability probe finds no adapter or
    /// context acquisition fails for any other reason.
    pub async fn new(window: Arc<Window>, max_pixel_ratio: f32) -> Result<Self, ViewerError> {
        if !capability::supports_rendering() {
            return Err(ViewerError::Render(
                "3D rendering is not supported in this environment".into(),
            ));
        }

        let size = window.inner_size();
        let scale_factor = window.scale_factor();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());

        // The surface must outlive the window; `Arc` guarantees this.
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| ViewerError::Render(format!("surface creation failed: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| {
                ViewerError::Render("no GPU adapter compatible with the window surface".into())
            })?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    // Default limits for broad compatibility.
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .map_err(|e| ViewerError::Render(format!("device acquisition failed: {e}")))?;

        // Prefer an sRGB surface format.
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(caps.formats[0]);

        let buffer = capped_surface_size(size, scale_factor, max_pixel_ratio);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: buffer.width.max(1),
            height: buffer.height.max(1),
            present_mode: wgpu::PresentMode::Fifo, // V-sync
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            scale_factor,
            max_pixel_ratio,
        })
    }

    /// Resizes the swap chain when the window size changes.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            let buffer = capped_surface_size(new_size, self.scale_factor, self.max_pixel_ratio);
            self.config.width = buffer.width;
            self.config.height = buffer.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Tracks monitor scale changes so the cap stays accurate.
    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_leaves_low_dpi_alone() {
        let size = PhysicalSize::new(800, 600);
        assert_eq!(capped_surface_size(size, 1.0, 2.0), size);
        assert_eq!(capped_surface_size(size, 2.0, 2.0), size);
    }

    #[test]
    fn cap_shrinks_high_dpi_buffers() {
        let size = PhysicalSize::new(3000, 1500);
        let capped = capped_surface_size(size, 3.0, 2.0);
        assert_eq!(capped, PhysicalSize::new(2000, 1000));
    }

    #[test]
    fn cap_never_yields_zero() {
        let capped = capped_surface_size(PhysicalSize::new(1, 1), 4.0, 2.0);
        assert!(capped.width >= 1 && capped.height >= 1);
    }
}
