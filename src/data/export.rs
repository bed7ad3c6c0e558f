use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::series::Series;

/// One CSV row. `elevation` is written blank for binned dates.
#[derive(Serialize)]
struct Row<'a> {
    date: &'a str,
    elevation: &'a str,
    x: f64,
    y: f64,
    fitted_y: f64,
}

/// Write `series` as CSV with a `date,elevation,x,y,fitted_y` header.
pub fn write_csv<W: Write>(writer: W, series: &Series) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    if series.is_empty() {
        csv.write_record(["date", "elevation", "x", "y", "fitted_y"])
            .context("writing CSV header")?;
    }
    for (i, obs) in series.iter().enumerate() {
        csv.serialize(Row {
            date: &obs.date,
            elevation: obs.elevation.as_deref().unwrap_or(""),
            x: obs.x,
            y: obs.y,
            fitted_y: obs.fitted_y,
        })
        .with_context(|| format!("writing CSV row {i}"))?;
    }
    csv.flush().context("flushing CSV")?;
    Ok(())
}

/// Export `series` to a CSV file at `path`.
pub fn export_csv(path: &Path, series: &Series) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(file, series)
}
