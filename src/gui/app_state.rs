use std::time::Duration;

use eframe::egui;
use log::{debug, error, info};
use maskfx::config::APP_VERSION;
use maskfx::{AudioStatus, Controller, FaceConfig, Mode, SourceKind};

use super::components::{render_config_panel, render_face, render_live_monitoring};

const MODE_KEYS: [(egui::Key, char); 4] = [
    (egui::Key::Num1, '1'),
    (egui::Key::Num2, '2'),
    (egui::Key::Num3, '3'),
    (egui::Key::Num4, '4'),
];

pub struct AppState {
    controller: Controller,
    pending_config: FaceConfig, // Local copy for sliders
    active_source: Option<SourceKind>,
    pending_source: Option<SourceKind>, // Local selection for source selector
}

impl eframe::App for AppState {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keys(ctx);

        let dt = ctx.input(|i| i.stable_dt);
        self.controller.update(Duration::from_secs_f32(dt.max(0.0)));

        self.render_top_panel(ctx);
        self.render_bottom_panel(ctx);
        self.render_side_panel(ctx);
        self.render_central_panel(ctx);

        ctx.request_repaint();
    }
}

impl AppState {
    pub fn new(mut controller: Controller) -> Self {
        debug!("Initializing GUI state...");

        let initial_source = Some(SourceKind::Microphone);
        let status = controller.set_audio_source(initial_source);
        info!("Initial audio status: {status:?}");

        let pending_config = controller.config().clone();

        Self {
            controller,
            pending_config,
            active_source: initial_source,
            pending_source: initial_source,
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let pressed: Vec<Mode> = ctx.input(|i| {
            MODE_KEYS
                .iter()
                .filter(|(key, _)| i.key_pressed(*key))
                .filter_map(|(_, c)| Mode::from_key(*c))
                .collect()
        });
        for mode in pressed {
            self.controller.set_mode(mode);
        }
    }

    fn apply_settings(&mut self) {
        debug!(
            "Applying settings - Source: {:?}, Config: {:?}",
            self.pending_source, self.pending_config
        );

        if let Err(err) = self.controller.apply_config(self.pending_config.clone()) {
            error!("Failed to apply config: {err:#}");
        }

        if self.pending_source != self.active_source {
            debug!("Switching audio source...");
            self.controller.set_audio_source(self.pending_source);
            self.active_source = self.pending_source;
        }

        info!("Settings applied successfully");
    }

    fn reset_to_default(&mut self) {
        debug!("Resetting config to defaults");
        self.pending_config = FaceConfig::default();
    }

    fn disable_apply_button(&self) -> bool {
        let config_unchanged = self.pending_config == *self.controller.config();
        let source_unchanged = self.pending_source == self.active_source;

        config_unchanged && source_unchanged
    }

    fn render_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.heading(format!("MASKFX {APP_VERSION}"));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    match self.controller.audio_status() {
                        AudioStatus::Listening(kind) => {
                            ui.colored_label(egui::Color32::GREEN, format!("Listening ({kind})"))
                        }
                        AudioStatus::Starting(kind) => ui.colored_label(
                            egui::Color32::YELLOW,
                            format!("Opening {kind}..."),
                        ),
                        AudioStatus::Unavailable(kind) => ui.colored_label(
                            egui::Color32::RED,
                            format!("Audio unavailable ({kind})"),
                        ),
                        AudioStatus::Off => ui.colored_label(egui::Color32::GRAY, "Audio off"),
                    };
                });
            });
            ui.add_space(4.0);
            ui.separator();
            ui.add_space(4.0);

            // Source Selection
            ui.horizontal(|ui| {
                ui.label("Audio Source:");
                egui::ComboBox::from_id_salt("source_selector")
                    .selected_text(source_label(self.pending_source))
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.pending_source, None, source_label(None));
                        for kind in SourceKind::ALL {
                            ui.selectable_value(
                                &mut self.pending_source,
                                Some(kind),
                                source_label(Some(kind)),
                            );
                        }
                    });
            });
            ui.add_space(4.0);
        });
    }

    fn render_bottom_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                ui.add_space(4.0);
                let apply_enabled = !self.disable_apply_button();

                if apply_enabled {
                    if ui.button("Apply Settings").clicked() {
                        self.apply_settings();
                    }
                } else {
                    ui.add_enabled(false, egui::Button::new("Apply Settings"));
                }

                if ui.button("↺ Reset to Default").clicked() {
                    self.reset_to_default();
                }

                ui.separator();

                let current = self.controller.mode();
                for (index, mode) in Mode::ALL.into_iter().enumerate() {
                    let label = format!("[{}] {}", index + 1, mode);
                    if ui.selectable_label(current == mode, label).clicked() {
                        self.controller.set_mode(mode);
                    }
                }
            });
            ui.add_space(8.0);
        });
    }

    fn render_side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("settings_panel")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .show(ui, |ui| {
                        ui.add_space(8.0);

                        // Live Monitoring Section
                        render_live_monitoring(ui, &self.controller);

                        ui.add_space(20.0);

                        // Configuration Section
                        render_config_panel(ui, &mut self.pending_config);
                    });
            });
    }

    fn render_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(
                egui::Frame::default()
                    .fill(egui::Color32::from_rgb(5, 5, 5))
                    .inner_margin(0.0),
            )
            .show(ctx, |ui| {
                let response = render_face(ui, self.controller.snapshot());

                // Pointer events only overwrite the target; the next frame picks it up
                if let Some(pos) = response.hover_pos() {
                    let rect = response.rect;
                    self.controller.pointer().set_from_pixels(
                        pos.x - rect.left(),
                        pos.y - rect.top(),
                        rect.width(),
                        rect.height(),
                    );
                }
            });
    }
}

fn source_label(source: Option<SourceKind>) -> &'static str {
    match source {
        None => "None",
        Some(SourceKind::Microphone) => "Microphone",
        Some(SourceKind::SystemOutput) => "System output",
    }
}
