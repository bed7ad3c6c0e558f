use std::path::PathBuf;

use eframe::egui;

use sandbar_viewer::config::ViewerConfig;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SandbarApp {
    pub state: AppState,
}

impl SandbarApp {
    /// Create the app, loading `initial` right away when given.
    pub fn new(config: ViewerConfig, initial: Option<PathBuf>) -> Self {
        let mut state = AppState::new(config);
        if let Some(path) = initial {
            panels::load_file(&mut state, path);
        }
        Self { state }
    }
}

impl eframe::App for SandbarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: small multiples ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::report_grid(ui, &mut self.state);
        });

        plot::drill_down_window(ctx, &mut self.state);
    }
}
