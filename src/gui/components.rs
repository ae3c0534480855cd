mod config_panel;
mod face_view;
mod live_monitoring;

pub use config_panel::render_config_panel;
pub use face_view::render_face;
pub use live_monitoring::render_live_monitoring;
