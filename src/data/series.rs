use serde::Serialize;

use super::model::{DateEntry, Dataset, Quantity};

// ---------------------------------------------------------------------------
// Series types
// ---------------------------------------------------------------------------

/// One plotted point: a survey date (and elevation, for incremental
/// reports) with its x/y measurement values and the regression estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub date: String,
    pub elevation: Option<String>,
    pub x: f64,
    pub y: f64,
    pub fitted_y: f64,
}

/// Observations for one (channel, site, bin, quantity), in document order.
/// Empty means the combination has no data.
pub type Series = Vec<Observation>;

/// Identifies one small-multiple chart.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesKey {
    pub channel: String,
    pub site: String,
    pub bin: String,
    pub quantity: Quantity,
}

impl SeriesKey {
    pub fn new(
        channel: impl Into<String>,
        site: impl Into<String>,
        bin: impl Into<String>,
        quantity: Quantity,
    ) -> Self {
        Self {
            channel: channel.into(),
            site: site.into(),
            bin: bin.into(),
            quantity,
        }
    }

    /// Heading used by the drill-down view.
    pub fn title(&self) -> String {
        format!(
            "{} - {} - {} - {}",
            self.quantity, self.channel, self.site, self.bin
        )
    }
}

/// Least-squares line `y = intercept + slope * x`.
///
/// When every x is equal the slope is undefined; the fit then falls back to
/// the horizontal line through the mean of y (`slope = 0`,
/// `intercept = ȳ`) and sets `degenerate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination; `None` for degenerate fits or when y is constant.
    pub r_squared: Option<f64>,
    pub degenerate: bool,
}

impl Fit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract the observations for `key`, fitted against the dataset's
/// measurement pair.
pub fn extract(dataset: &Dataset, key: &SeriesKey) -> Series {
    extract_with_fit(dataset, key).0
}

/// Like [`extract`], also returning the fitted line (`None` for an empty series).
pub fn extract_with_fit(dataset: &Dataset, key: &SeriesKey) -> (Series, Option<Fit>) {
    let mut series = collect_observations(dataset, key);

    let points: Vec<(f64, f64)> = series.iter().map(|o| (o.x, o.y)).collect();
    let Some(fit) = fit_line(&points) else {
        return (Series::new(), None);
    };
    if fit.degenerate {
        log::warn!(
            "{}: x has no variance across {} observation(s); using flat fit",
            key.title(),
            series.len()
        );
    }

    for obs in &mut series {
        obs.fitted_y = fit.predict(obs.x);
    }
    (series, Some(fit))
}

/// Walk the dates of one bin and pick out every (x, y) pair present for
/// the requested quantity. `fitted_y` is left at zero for the caller to fill.
fn collect_observations(dataset: &Dataset, key: &SeriesKey) -> Series {
    let Some(bin) = dataset.bin(&key.channel, &key.site, &key.bin) else {
        return Series::new();
    };
    let selector = &dataset.selector;

    let mut series = Series::new();
    for (date, entry) in &bin.dates {
        match entry {
            DateEntry::Binned(map) => {
                if let Some((x, y)) = selector.pair(map, key.quantity) {
                    series.push(Observation {
                        date: date.clone(),
                        elevation: None,
                        x,
                        y,
                        fitted_y: 0.0,
                    });
                }
            }
            DateEntry::Elevated(levels) => {
                for (elevation, map) in levels {
                    if let Some((x, y)) = selector.pair(map, key.quantity) {
                        series.push(Observation {
                            date: date.clone(),
                            elevation: Some(elevation.clone()),
                            x,
                            y,
                            fitted_y: 0.0,
                        });
                    }
                }
            }
        }
    }
    series
}

// ---------------------------------------------------------------------------
// Regression
// ---------------------------------------------------------------------------

/// Ordinary least-squares fit over `points`. `None` when there are no points.
pub fn fit_line(points: &[(f64, f64)]) -> Option<Fit> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let x_mean = points.iter().map(|&(x, _)| x).sum::<f64>() / n;
    let y_mean = points.iter().map(|&(_, y)| y).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in points {
        let xr = x - x_mean;
        let yr = y - y_mean;
        sxy += xr * yr;
        sxx += xr * xr;
        syy += yr * yr;
    }

    // Identical x values can leave a tiny non-zero sxx from rounding in the mean.
    let first_x = points[0].0;
    let constant_x = points.iter().all(|&(x, _)| x == first_x);
    let slope = sxy / sxx;
    if constant_x || sxx == 0.0 || !slope.is_finite() {
        return Some(Fit {
            slope: 0.0,
            intercept: y_mean,
            r_squared: None,
            degenerate: true,
        });
    }

    let intercept = y_mean - slope * x_mean;
    let r_squared = (syy > 0.0).then(|| (sxy * sxy) / (sxx * syy));
    Some(Fit {
        slope,
        intercept,
        r_squared,
        degenerate: false,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data::loader::from_value;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn dataset(bin: serde_json::Value) -> Dataset {
        from_value(&json!({
            "data": { "Main": { "003L": { "low": bin } } },
            "meta": { "147": "Eddy", "148": "Bar" }
        }))
        .unwrap()
    }

    fn binned(x: f64, y: f64) -> serde_json::Value {
        json!({
            "Eddy": { "Area": x, "Volume": x * 10.0 },
            "Bar": { "Area": y, "Volume": y * 10.0 }
        })
    }

    fn key(quantity: Quantity) -> SeriesKey {
        SeriesKey::new("Main", "003L", "low", quantity)
    }

    // ==========================================================================
    // REGRESSION
    // ==========================================================================

    #[test]
    fn perfectly_linear_series_is_reproduced() {
        let ds = dataset(json!({
            "2009": binned(1.0, 3.0),
            "2010": binned(2.0, 5.0),
            "2011": binned(3.0, 7.0)
        }));

        let (series, fit) = extract_with_fit(&ds, &key(Quantity::Area));
        let fit = fit.unwrap();

        assert!(approx(fit.slope, 2.0));
        assert!(approx(fit.intercept, 1.0));
        assert!(approx(fit.r_squared.unwrap(), 1.0));
        assert!(!fit.degenerate);
        assert_eq!(series.len(), 3);
        for obs in &series {
            assert!(approx(obs.fitted_y, obs.y), "{obs:?}");
        }
    }

    #[test]
    fn zero_variance_x_falls_back_to_mean_of_y() {
        let fit = fit_line(&[(0.1, 1.0), (0.1, 2.0), (0.1, 6.0)]).unwrap();
        assert!(fit.degenerate);
        assert_eq!(fit.slope, 0.0);
        assert!(approx(fit.intercept, 3.0));
        assert_eq!(fit.r_squared, None);

        // Small spread at a large offset is still a real slope.
        let fit = fit_line(&[(1e8, 1.0), (1e8 + 1.0, 2.0), (1e8 + 2.0, 3.0)]).unwrap();
        assert!(!fit.degenerate);
        assert!(approx(fit.slope, 1.0));
        assert!(approx(fit.predict(1e8 + 1.0), 2.0));

        let ds = dataset(json!({ "2009": binned(4.0, 8.0) }));
        let (series, fit) = extract_with_fit(&ds, &key(Quantity::Volume));
        assert!(fit.unwrap().degenerate);
        assert_eq!(series[0].fitted_y, 80.0);
        assert!(series.iter().all(|o| o.fitted_y.is_finite()));
    }

    #[test]
    fn fit_line_of_nothing_is_none() {
        assert_eq!(fit_line(&[]), None);
    }

    #[test]
    fn constant_y_has_no_r_squared() {
        let fit = fit_line(&[(1.0, 5.0), (2.0, 5.0), (3.0, 5.0)]).unwrap();
        assert!(!fit.degenerate);
        assert!(approx(fit.slope, 0.0));
        assert_eq!(fit.r_squared, None);
    }

    // ==========================================================================
    // EXTRACTION
    // ==========================================================================

    #[test]
    fn mixed_binned_and_elevated_dates() {
        let ds = dataset(json!({
            "2009-10-01": binned(1.0, 2.0),
            "2010-10-01": {
                "8.0": binned(2.0, 3.0),
                "8.5": binned(3.0, 5.0)
            }
        }));

        let series = extract(&ds, &key(Quantity::Area));
        let shape: Vec<(&str, Option<&str>)> = series
            .iter()
            .map(|o| (o.date.as_str(), o.elevation.as_deref()))
            .collect();
        assert_eq!(
            shape,
            [
                ("2009-10-01", None),
                ("2010-10-01", Some("8.0")),
                ("2010-10-01", Some("8.5")),
            ]
        );
    }

    #[test]
    fn observations_missing_a_value_are_skipped() {
        let ds = dataset(json!({
            "2009": binned(1.0, 2.0),
            "2010": { "Eddy": { "Area": 5.0 }, "Bar": { "Volume": 1.0 } },
            "2011": { "Eddy": { "Area": 5.0 } },
            "2012": { "8.0": { "Bar": { "Area": 1.0 } }, "8.5": binned(2.0, 4.0) },
            "2013": binned(3.0, 6.0)
        }));

        let series = extract(&ds, &key(Quantity::Area));
        let dates: Vec<&str> = series.iter().map(|o| o.date.as_str()).collect();
        assert_eq!(dates, ["2009", "2012", "2013"]);
        assert!(series.iter().all(|o| o.x != 0.0));
    }

    #[test]
    fn unknown_combination_is_empty() {
        let ds = dataset(json!({ "2009": binned(1.0, 2.0) }));
        let missing = SeriesKey::new("Main", "003L", "high", Quantity::Area);
        assert!(extract(&ds, &missing).is_empty());
        assert_eq!(extract_with_fit(&ds, &missing).1, None);
    }

    #[test]
    fn extraction_is_repeatable() {
        let ds = dataset(json!({
            "2009": binned(1.0, 2.5),
            "2010": binned(2.0, 3.0),
            "2011": binned(4.0, 9.0)
        }));
        let k = key(Quantity::Volume);
        assert_eq!(extract(&ds, &k), extract(&ds, &k));
    }

    #[test]
    fn series_title() {
        assert_eq!(key(Quantity::Volume).title(), "Volume - Main - 003L - low");
    }
}
