use eframe::egui;

use maskfx::FaceConfig;

pub fn render_config_panel(ui: &mut egui::Ui, config: &mut FaceConfig) {
    ui.label(egui::RichText::new("Configuration").size(16.0));
    ui.add_space(8.0);

    render_motion(ui, config);

    ui.add_space(8.0);

    render_glitch(ui, config);

    ui.add_space(8.0);

    render_audio(ui, config);

    ui.add_space(20.0);
}

fn render_motion(ui: &mut egui::Ui, config: &mut FaceConfig) {
    egui::CollapsingHeader::new("Motion")
        .default_open(true)
        .show(ui, |ui| {
            ui.add_space(4.0);
            egui::Grid::new("motion_settings_grid")
                .num_columns(2)
                .spacing([20.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Volume Smoothing:")
                        .on_hover_text("Higher = mouth and glow react faster");
                    ui.add(egui::Slider::new(&mut config.volume_smoothing, 0.01..=1.0));
                    ui.end_row();

                    ui.label("Head Smoothing:")
                        .on_hover_text("Lower = slower, more cinematic head turns");
                    ui.add(egui::Slider::new(
                        &mut config.orientation_smoothing,
                        0.01..=1.0,
                    ));
                    ui.end_row();

                    ui.label("Yaw Range:");
                    ui.add(egui::Slider::new(&mut config.yaw_scale, 0.0..=1.5).suffix(" rad"));
                    ui.end_row();

                    ui.label("Pitch Range:");
                    ui.add(egui::Slider::new(&mut config.pitch_scale, 0.0..=1.5).suffix(" rad"));
                    ui.end_row();

                    ui.label("Frame-rate Independent:")
                        .on_hover_text("Scale smoothing by the real frame time");
                    ui.checkbox(&mut config.frame_rate_independent, "");
                    ui.end_row();
                });
        });
}

fn render_glitch(ui: &mut egui::Ui, config: &mut FaceConfig) {
    egui::CollapsingHeader::new("Glitch & Blink")
        .default_open(true)
        .show(ui, |ui| {
            ui.add_space(4.0);
            egui::Grid::new("glitch_settings_grid")
                .num_columns(2)
                .spacing([20.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Twitch Chance:")
                        .on_hover_text("Probability per frame that an eye twitches");
                    ui.add(egui::Slider::new(&mut config.jitter_probability, 0.0..=0.2));
                    ui.end_row();

                    ui.label("Twitch Size:");
                    ui.add(egui::Slider::new(&mut config.jitter_amplitude, 0.0..=0.1));
                    ui.end_row();

                    ui.label("Blink Every (min):");
                    ui.add(
                        egui::Slider::new(&mut config.blink_min_interval_ms, 200..=10_000)
                            .suffix(" ms"),
                    );
                    ui.end_row();

                    ui.label("Blink Every (max):");
                    ui.add(
                        egui::Slider::new(&mut config.blink_max_interval_ms, 200..=10_000)
                            .suffix(" ms"),
                    );
                    ui.end_row();

                    ui.label("Blink Length:");
                    ui.add(egui::Slider::new(&mut config.blink_closed_ms, 50..=600).suffix(" ms"));
                    ui.end_row();
                });
        });
}

fn render_audio(ui: &mut egui::Ui, config: &mut FaceConfig) {
    egui::CollapsingHeader::new("Audio")
        .default_open(true)
        .show(ui, |ui| {
            ui.add_space(4.0);
            egui::Grid::new("audio_settings_grid")
                .num_columns(2)
                .spacing([20.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Mic Normalization:")
                        .on_hover_text("Higher = microphone reads quieter");
                    ui.add(egui::Slider::new(&mut config.mic_normalization, 32.0..=255.0));
                    ui.end_row();

                    ui.label("System Normalization:")
                        .on_hover_text("Higher = system audio reads quieter");
                    ui.add(egui::Slider::new(
                        &mut config.system_normalization,
                        32.0..=255.0,
                    ));
                    ui.end_row();

                    ui.label("Mouth Gain:")
                        .on_hover_text("How far the mouth stretches with volume");
                    ui.add(egui::Slider::new(&mut config.mouth_volume_gain, 0.0..=3.0));
                    ui.end_row();
                });
        });
}
