use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use sandbar_viewer::data::model::Quantity;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (210.0 + (i as f32 / n as f32) * 360.0) % 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Quantity colours: Area / Volume columns
// ---------------------------------------------------------------------------

/// Colours for the scatter points of each quantity's columns.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<Quantity, Color32>,
    /// Regression line colour shared by all charts.
    pub fit_line: Color32,
}

impl Default for ColorMap {
    fn default() -> Self {
        let mapping = Quantity::ALL
            .into_iter()
            .zip(generate_palette(Quantity::ALL.len()))
            .collect();
        ColorMap {
            mapping,
            fit_line: Color32::from_rgb(180, 100, 180),
        }
    }
}

impl ColorMap {
    pub fn color_for(&self, quantity: Quantity) -> Color32 {
        self.mapping
            .get(&quantity)
            .copied()
            .unwrap_or(Color32::GRAY)
    }
}
