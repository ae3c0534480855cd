use eframe::egui;
use maskfx::Controller;
use maskfx::RenderParameterSnapshot;

pub fn render_live_monitoring(ui: &mut egui::Ui, controller: &Controller) {
    ui.label(egui::RichText::new("Live Monitoring").size(16.0));
    ui.add_space(8.0);

    render_audio_levels(ui, controller);
    ui.add_space(8.0);

    render_snapshot(ui, controller.snapshot(), controller.frame_count());
    ui.add_space(12.0);
}

fn render_audio_levels(ui: &mut egui::Ui, controller: &Controller) {
    ui.group(|ui| {
        ui.colored_label(egui::Color32::LIGHT_BLUE, "Volume:");
        ui.horizontal(|ui| {
            ui.label("Raw:");
            ui.strong(format!("{:.2}", controller.raw_volume()));

            ui.separator();

            ui.label("Smoothed:");
            ui.strong(format!("{:.2}", controller.smoothed_volume()));
        });
        ui.add(egui::ProgressBar::new(controller.smoothed_volume().clamp(0.0, 1.0)));
    });
}

fn render_snapshot(ui: &mut egui::Ui, snapshot: &RenderParameterSnapshot, frames: u64) {
    ui.group(|ui| {
        ui.colored_label(egui::Color32::LIGHT_GREEN, "Controller Output:");
        ui.horizontal(|ui| {
            ui.label("Mode:");
            ui.strong(snapshot.mode.as_str());

            ui.separator();

            if snapshot.blinking {
                ui.colored_label(egui::Color32::YELLOW, "BLINK");
            } else {
                ui.colored_label(egui::Color32::GRAY, "Eyes open");
            }
        });
        ui.horizontal(|ui| {
            ui.label("Yaw:");
            ui.strong(format!("{:+.3}", snapshot.orientation.yaw));

            ui.separator();

            ui.label("Pitch:");
            ui.strong(format!("{:+.3}", snapshot.orientation.pitch));
        });
        ui.horizontal(|ui| {
            ui.label("Eye scale:");
            ui.strong(format!("{:.2}", snapshot.eye_scale.x));

            ui.separator();

            ui.label("Glow:");
            ui.strong(format!("{:.0}%", snapshot.glow_opacity * 100.0));
        });
        ui.label(format!("Frames: {frames}"));
    });
}
