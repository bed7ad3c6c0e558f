mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use app::SandbarApp;
use eframe::egui;
use sandbar_viewer::config::ViewerConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = ViewerConfig::from_env();
    // Optional report path, e.g. `sandbar-viewer reports/binned.json`.
    let initial = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sandbar Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(SandbarApp::new(config, initial)))),
    )
}
