use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "SANDBAR_VIEWER_CONFIG";

/// Outer size of one chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSize {
    pub width: f32,
    pub height: f32,
    pub point_radius: f32,
}

impl ChartSize {
    pub fn square(side: f32, point_radius: f32) -> Self {
        Self {
            width: side,
            height: side,
            point_radius,
        }
    }

    pub fn size(&self) -> [f32; 2] {
        [self.width.max(1.0), self.height.max(1.0)]
    }
}

impl Default for ChartSize {
    fn default() -> Self {
        Self::square(200.0, 1.5)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Grid cells.
    pub small_chart: ChartSize,
    /// Drill-down window.
    pub large_chart: ChartSize,
    pub window_size: [f32; 2],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            small_chart: ChartSize::square(200.0, 1.5),
            large_chart: ChartSize::square(600.0, 3.5),
            window_size: [1200.0, 800.0],
        }
    }
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).context("parsing viewer config")
    }

    /// Config from [`CONFIG_ENV`] if set, falling back to defaults.
    pub fn from_env() -> Self {
        let Some(path) = std::env::var_os(CONFIG_ENV) else {
            return Self::default();
        };
        match Self::load(Path::new(&path)) {
            Ok(config) => {
                log::info!("Loaded viewer config from {}", Path::new(&path).display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring viewer config: {e:#}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chart_sizes() {
        let config = ViewerConfig::default();
        assert_eq!(config.small_chart.size(), [200.0, 200.0]);
        assert_eq!(config.small_chart.point_radius, 1.5);
        assert_eq!(config.large_chart.size(), [600.0, 600.0]);
        assert_eq!(config.large_chart.point_radius, 3.5);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: ViewerConfig =
            serde_json::from_str(r#"{ "large_chart": { "width": 800 } }"#).unwrap();
        assert_eq!(config.large_chart.width, 800.0);
        assert_eq!(config.large_chart.height, 200.0);
        assert_eq!(config.small_chart, ChartSize::default());
        assert_eq!(config.window_size, [1200.0, 800.0]);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(ViewerConfig::load(Path::new("/nonexistent/viewer.json")).is_err());
    }
}
