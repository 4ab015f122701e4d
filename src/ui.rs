//! egui overlays: the stats HUD, a loading indicator, and the error panel.

use egui::{Align2, Color32, RichText};

/// Top-left HUD with the dataset size and the measured frame rate.
pub fn draw_hud(ctx: &egui::Context, fps: Option<u32>, point_count: usize) {
    egui::Area::new(egui::Id::new("hud"))
        .anchor(Align2::LEFT_TOP, [12.0, 12.0])
        .show(ctx, |ui| {
            egui::Frame::none()
                .fill(Color32::from_black_alpha(160))
                .inner_margin(8.0)
                .rounding(4.0)
                .show(ui, |ui| {
                    ui.label(
                        RichText::new(format!("{point_count} points"))
                            .color(Color32::WHITE)
                            .monospace(),
                    );
                    if let Some(fps) = fps {
                        ui.label(
                            RichText::new(format!("{fps} fps"))
                                .color(Color32::GRAY)
                                .monospace(),
                        );
                    }
                });
        });
}

/// Centered notice shown while the dataset request is in flight.
pub fn draw_loading(ctx: &egui::Context) {
    egui::Area::new(egui::Id::new("loading"))
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(
                RichText::new("Loading data...")
                    .color(Color32::WHITE)
                    .size(18.0),
            );
        });
}

/// Full error panel. Render failures get remediation hints; data failures
/// only report the message since retrying is a relaunch away.
pub fn draw_error(ctx: &egui::Context, message: &str, render_related: bool) {
    egui::Area::new(egui::Id::new("error"))
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            egui::Frame::none()
                .fill(Color32::from_black_alpha(200))
                .inner_margin(16.0)
                .rounding(6.0)
                .show(ui, |ui| {
                    ui.label(
                        RichText::new(message)
                            .color(Color32::from_rgb(255, 96, 96))
                            .size(16.0),
                    );
                    if render_related {
                        ui.add_space(8.0);
                        ui.label(RichText::new("Please try:").color(Color32::WHITE));
                        for hint in [
                            "Updating your graphics drivers",
                            "Checking that Vulkan, Metal or DirectX 12 is available",
                            "Running on a machine with a supported GPU",
                        ] {
                            ui.label(
                                RichText::new(format!("  \u{2022} {hint}")).color(Color32::GRAY),
                            );
                        }
                    }
                });
        });
}
