//! GPU capability probe.

/// Checks whether a usable GPU adapter exists, without touching any surface.
/// Never panics; any failure reads as "unsupported". Logs the adapter
/// identity when one is found, which is the first thing worth knowing when
/// debugging a blank viewport.
pub fn supports_rendering() -> bool {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }));

    match adapter {
        Some(adapter) => {
            let info = adapter.get_info();
            log::info!(
                "GPU adapter: {} ({:?}, {:?}, driver: {})",
                info.name,
                info.backend,
                info.device_type,
                info.driver
            );
            true
        }
        None => {
            log::error!("No compatible GPU adapter found");
            false
        }
    }
}
