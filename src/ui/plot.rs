use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_plot::{Line, Plot, PlotPoint, PlotPoints, Points};

use sandbar_viewer::config::ChartSize;
use sandbar_viewer::data::layout::GridCell;
use sandbar_viewer::data::model::{MeasurementSelector, Quantity};
use sandbar_viewer::data::series::{Fit, Observation, Series, SeriesKey};

use crate::color::ColorMap;
use crate::state::AppState;

const FIT_SERIES: &str = "fit";

// ---------------------------------------------------------------------------
// Small multiples (central panel)
// ---------------------------------------------------------------------------

/// Render one table per site, a row per channel and a column per
/// quantity/bin. Clicking a chart opens the drill-down view.
pub fn report_grid(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = &state.dataset else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a report to view charts  (File → Open…)");
        });
        return;
    };

    if state.grid.column_count() == 0 || state.grid.tables.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Nothing matches the current filters.");
        });
        return;
    }

    let selector = &dataset.selector;
    let size = state.config.small_chart;
    let mut clicked: Option<SeriesKey> = None;

    ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for table in &state.grid.tables {
                egui::Grid::new(("site_table", &table.site))
                    .spacing([4.0, 4.0])
                    .show(ui, |ui: &mut Ui| {
                        // Heading rows: quantity groups, then bins.
                        ui.heading(&table.site);
                        for group in &state.grid.columns {
                            for (i, _) in group.bins.iter().enumerate() {
                                if i == 0 {
                                    ui.strong(
                                        RichText::new(group.quantity.to_string())
                                            .color(state.color_map.color_for(group.quantity)),
                                    );
                                } else {
                                    ui.label("");
                                }
                            }
                        }
                        ui.end_row();

                        ui.label("");
                        for group in &state.grid.columns {
                            for bin in &group.bins {
                                ui.label(bin);
                            }
                        }
                        ui.end_row();

                        for row in &table.rows {
                            ui.label(&row.channel);
                            for cell in &row.cells {
                                if small_chart(ui, cell, selector, &size, &state.color_map) {
                                    clicked = Some(cell.key.clone());
                                }
                            }
                            ui.end_row();
                        }
                    });
                ui.add_space(12.0);
            }
        });

    if let Some(key) = clicked {
        state.open_drill_down(key);
    }
}

/// Draw one grid chart. Returns whether it was clicked.
fn small_chart(
    ui: &mut Ui,
    cell: &GridCell,
    selector: &MeasurementSelector,
    size: &ChartSize,
    colors: &ColorMap,
) -> bool {
    let [width, height] = size.size();
    if cell.series.is_empty() {
        ui.add_sized(
            [width, height],
            egui::Label::new(RichText::new("no data").weak()),
        );
        return false;
    }

    let key = &cell.key;
    let response = Plot::new(("small_chart", key))
        .width(width)
        .height(height)
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show_x(false)
        .show_y(false)
        .show(ui, |plot_ui| {
            plot_ui.line(fit_line(&cell.series, colors.fit_line));
            plot_ui.points(scatter(&cell.series, key.quantity, colors, size.point_radius));
        })
        .response;

    response.on_hover_text(small_chart_hover(selector, key)).clicked()
}

/// Grid charts carry no axis labels; the measurement pair goes in the tooltip.
fn small_chart_hover(selector: &MeasurementSelector, key: &SeriesKey) -> String {
    format!(
        "{} {} vs {}\nClick to enlarge",
        key.quantity, selector.x, selector.y
    )
}

// ---------------------------------------------------------------------------
// Drill-down window
// ---------------------------------------------------------------------------

/// Render the enlarged chart for the selected cell, if any.
pub fn drill_down_window(ctx: &egui::Context, state: &mut AppState) {
    let Some(selector) = state.dataset.as_ref().map(|ds| ds.selector.clone()) else {
        return;
    };
    let size = state.config.large_chart;
    let mut export = false;

    if let Some(drill) = state.drill_down.as_mut() {
        let title = drill.key.title();
        let quantity = drill.key.quantity;
        let series = &drill.series;
        let fit = drill.fit;
        let colors = &state.color_map;

        egui::Window::new(title)
            .id(egui::Id::new("drill_down"))
            .open(&mut drill.open)
            .resizable(true)
            .collapsible(false)
            .show(ctx, |ui: &mut Ui| {
                ui.horizontal(|ui: &mut Ui| {
                    ui.label(fit_summary(fit, series.len()));
                    if ui
                        .add_enabled(!series.is_empty(), egui::Button::new("Export CSV…"))
                        .clicked()
                    {
                        export = true;
                    }
                });
                ui.separator();

                if series.is_empty() {
                    ui.add_sized(size.size(), egui::Label::new("No data for this combination."));
                    return;
                }

                let [width, height] = size.size();
                let points = series.clone();
                let x_label = format!("{quantity} {}", selector.x);
                let y_label = format!("{quantity} {}", selector.y);
                Plot::new("drill_down_plot")
                    .width(width)
                    .height(height)
                    .x_axis_label(selector.x.as_str())
                    .y_axis_label(selector.y.as_str())
                    .allow_boxed_zoom(true)
                    .allow_drag(true)
                    .allow_scroll(true)
                    .allow_zoom(true)
                    .label_formatter(move |name, value| {
                        if name == FIT_SERIES {
                            return String::new();
                        }
                        nearest(&points, value)
                            .map(|obs| hover_text(obs, &x_label, &y_label))
                            .unwrap_or_default()
                    })
                    .show(ui, |plot_ui| {
                        plot_ui.line(fit_line(series, colors.fit_line));
                        plot_ui.points(scatter(series, quantity, colors, size.point_radius));
                    });
            });
    }

    if export {
        super::panels::export_dialog(state);
    }
    state.prune_drill_down();
}

fn fit_summary(fit: Option<Fit>, n: usize) -> String {
    match fit {
        None => "No observations".to_string(),
        Some(fit) if fit.degenerate => {
            format!("n = {n}   y = {:.4} (no variance in x)", fit.intercept)
        }
        Some(fit) => {
            let r2 = fit
                .r_squared
                .map(|r| format!("   R² = {r:.3}"))
                .unwrap_or_default();
            format!(
                "n = {n}   y = {:.4} + {:.4}·x{r2}",
                fit.intercept, fit.slope
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Plot items
// ---------------------------------------------------------------------------

fn fit_line(series: &Series, color: Color32) -> Line {
    let points: PlotPoints = series.iter().map(|o| [o.x, o.fitted_y]).collect();
    Line::new(points).name(FIT_SERIES).color(color).width(1.5)
}

fn scatter(series: &Series, quantity: Quantity, colors: &ColorMap, radius: f32) -> Points<'static> {
    let points: PlotPoints = series.iter().map(|o| [o.x, o.y]).collect();
    Points::new(points)
        .name(quantity.to_string())
        .color(colors.color_for(quantity))
        .radius(radius)
        .filled(true)
}

/// Observation closest to `value`, measured in units of each axis' range.
fn nearest<'a>(series: &'a [Observation], value: &PlotPoint) -> Option<&'a Observation> {
    let range = |f: fn(&Observation) -> f64| {
        let (lo, hi) = series
            .iter()
            .map(f)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if hi > lo {
            hi - lo
        } else {
            1.0
        }
    };
    let x_range = range(|o| o.x);
    let y_range = range(|o| o.y);

    series.iter().min_by(|a, b| {
        let da = ((a.x - value.x) / x_range).powi(2) + ((a.y - value.y) / y_range).powi(2);
        let db = ((b.x - value.x) / x_range).powi(2) + ((b.y - value.y) / y_range).powi(2);
        da.total_cmp(&db)
    })
}

fn hover_text(obs: &Observation, x_label: &str, y_label: &str) -> String {
    let mut text = format!("Date: {}\n", obs.date);
    if let Some(elevation) = &obs.elevation {
        text.push_str(&format!("Elev.: {elevation}\n"));
    }
    text.push_str(&format!("{x_label}: {}\n{y_label}: {}", obs.x, obs.y));
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(date: &str, elevation: Option<&str>, x: f64, y: f64) -> Observation {
        Observation {
            date: date.into(),
            elevation: elevation.map(str::to_string),
            x,
            y,
            fitted_y: y,
        }
    }

    #[test]
    fn nearest_uses_axis_relative_distance() {
        let series = vec![obs("a", None, 0.0, 0.0), obs("b", None, 100.0, 1.0)];
        // Closer to "a" in raw x, but far relative to the y range.
        let hit = nearest(&series, &PlotPoint::new(40.0, 1.0)).unwrap();
        assert_eq!(hit.date, "b");
        assert!(nearest(&[], &PlotPoint::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn hover_text_includes_elevation_only_when_present() {
        let text = hover_text(&obs("2010-10-01", Some("8.5"), 2.0, 3.0), "Area Eddy", "Area Bar");
        assert_eq!(text, "Date: 2010-10-01\nElev.: 8.5\nArea Eddy: 2\nArea Bar: 3");

        let text = hover_text(&obs("2009-10-01", None, 2.5, 3.0), "x", "y");
        assert!(!text.contains("Elev."));
    }

    #[test]
    fn fit_summaries() {
        assert_eq!(fit_summary(None, 0), "No observations");
        let flat = Fit {
            slope: 0.0,
            intercept: 2.0,
            r_squared: None,
            degenerate: true,
        };
        assert!(fit_summary(Some(flat), 1).contains("no variance"));
    }

    #[test]
    fn small_chart_hover_names_the_measurements() {
        let selector = MeasurementSelector::new("Eddy", "Reattachment Bar");
        let key = SeriesKey::new("Main", "003L", "Low", Quantity::Area);
        assert_eq!(
            small_chart_hover(&selector, &key),
            "Area Eddy vs Reattachment Bar\nClick to enlarge"
        );
    }
}
