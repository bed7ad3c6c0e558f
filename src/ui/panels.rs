use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use sandbar_viewer::data::export::export_csv;
use sandbar_viewer::data::filter::{Dimension, SelectionEvent};
use sandbar_viewer::data::loader;
use sandbar_viewer::data::model::{sibling_path, Quantity};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // Events are collected first and applied after the widgets are drawn.
    let mut events = Vec::new();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if ui
                .add_enabled(
                    !state.selection.is_unrestricted(),
                    egui::Button::new("Show everything"),
                )
                .clicked()
            {
                events.push(SelectionEvent::Reset);
            }
            ui.separator();

            for dim in Dimension::ALL {
                let values = state.names.values(dim);
                let n_selected = state.selection.selected_count(dim);
                let header_text = if n_selected == 0 {
                    format!("{dim}  (all)")
                } else {
                    format!("{dim}  ({n_selected}/{})", values.len())
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim)
                    .default_open(dim == Dimension::Quantity)
                    .show(ui, |ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            events.push(SelectionEvent::Clear(dim));
                        }

                        for value in &values {
                            let mut checked = state.selection.is_selected(dim, value);
                            let mut text = RichText::new(value);
                            if dim == Dimension::Quantity {
                                if let Some(q) = Quantity::from_key(value) {
                                    text = text.color(state.color_map.color_for(q));
                                }
                            }
                            if ui.checkbox(&mut checked, text).changed() {
                                events.push(SelectionEvent::Toggle(dim, value.clone()));
                            }
                        }
                    });
            }
        });

    for event in events {
        state.handle(event);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(kind) = state.kind() {
            let target = kind.toggled();
            if ui.button(format!("Switch to {target}")).clicked() {
                if let Some(path) = state.source().map(sibling_path) {
                    log::info!("Switching to {target} report {}", path.display());
                    load_file(state, path);
                }
            }
            ui.label(format!("{kind} report"));
            ui.separator();
        }

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} vs {}: {} channels, {} sites, {} bins, {} charts",
                ds.selector.x,
                ds.selector.y,
                state.names.channels.len(),
                state.names.sites.len(),
                state.names.bins.len(),
                state.grid.cell_count()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sandbar report")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        load_file(state, path);
    }
}

/// Load `path` into the state, reporting failure in the status bar.
pub fn load_file(state: &mut AppState, path: PathBuf) {
    match loader::load_file(&path) {
        Ok(dataset) => {
            log::info!(
                "Loaded {} ({} vs {}): {} channels, {} survey dates",
                path.display(),
                dataset.selector.x,
                dataset.selector.y,
                dataset.channels.len(),
                dataset.date_count()
            );
            state.set_dataset(dataset, path);
        }
        Err(e) => {
            log::error!("Failed to load {}: {e}", path.display());
            state.status_message = Some(format!("Error loading {}: {e}", path.display()));
        }
    }
}

/// Ask for a destination and write the drill-down series as CSV.
pub fn export_dialog(state: &mut AppState) {
    let Some(drill) = &state.drill_down else {
        return;
    };
    let default_name = format!(
        "{}_{}_{}_{}.csv",
        drill.key.quantity, drill.key.channel, drill.key.site, drill.key.bin
    )
    .replace([' ', '/'], "_");

    let Some(path) = rfd::FileDialog::new()
        .set_title("Export series")
        .set_file_name(&default_name)
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };

    match export_csv(&path, &drill.series) {
        Ok(()) => {
            log::info!("Exported {} rows to {}", drill.series.len(), path.display());
            state.status_message = None;
        }
        Err(e) => {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

