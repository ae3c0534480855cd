mod gui;

use log::{debug, info};
use maskfx::{Controller, FaceConfig};

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting up...");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 640.0])
            .with_title("MASKFX"),
        ..Default::default()
    };

    debug!("Launching GUI...");
    let result = eframe::run_native(
        "maskfx face controller",
        options,
        Box::new(|_cc| {
            let controller = Controller::new(FaceConfig::default())?;
            Ok(Box::new(gui::AppState::new(controller)))
        }),
    );

    info!("Clean shutdown complete");

    result
}
