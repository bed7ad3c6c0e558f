use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};

const X_NAME: &str = "Eddy";
const Y_NAME: &str = "Reattachment Bar";

const CHANNELS: [&str; 2] = ["Main", "Side"];
const SITES: [&str; 4] = ["003L", "009L", "022R", "033L"];
const BINS: [&str; 3] = ["Low", "Middle", "High"];
const YEARS: std::ops::Range<u32> = 2009..2019;
const ELEVATIONS: [&str; 4] = ["8.0", "8.5", "9.0", "9.5"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Linear relation between the two measurements at one site/bin.
struct Trend {
    base: f64,
    slope: f64,
    offset: f64,
}

impl Trend {
    fn random(rng: &mut SimpleRng) -> Self {
        Trend {
            base: 500.0 + rng.next_f64() * 4000.0,
            slope: 0.2 + rng.next_f64() * 0.8,
            offset: rng.gauss(0.0, 50.0),
        }
    }

    /// One `{ x: {Area, Volume}, y: {Area, Volume} }` measurement object.
    fn measurements(&self, rng: &mut SimpleRng, scale: f64) -> Value {
        let x_area = (self.base * scale * (1.0 + rng.gauss(0.0, 0.25))).max(0.0);
        let y_area = (self.offset + self.slope * x_area + rng.gauss(0.0, 0.05 * self.base)).max(0.0);
        let depth = 0.5 + rng.next_f64();
        json!({
            X_NAME: { "Area": round(x_area), "Volume": round(x_area * depth) },
            Y_NAME: { "Area": round(y_area), "Volume": round(y_area * depth) },
        })
    }
}

fn round(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Build the `data` tree. `elevated` nests each date by elevation level.
fn build_data(rng: &mut SimpleRng, elevated: bool) -> Value {
    let mut channels = Map::new();
    for channel in CHANNELS {
        let mut sites = Map::new();
        for site in SITES {
            let mut bins = Map::new();
            for bin in BINS {
                let trend = Trend::random(rng);
                let mut dates = Map::new();
                for year in YEARS {
                    // Surveys are occasionally skipped.
                    if rng.next_f64() < 0.1 {
                        continue;
                    }
                    let date = format!("{year}-10-01");
                    let entry = if elevated {
                        let levels: Map<String, Value> = ELEVATIONS
                            .iter()
                            .enumerate()
                            .map(|(i, e)| {
                                let scale = 1.0 / (i as f64 + 1.0);
                                (e.to_string(), trend.measurements(rng, scale))
                            })
                            .collect();
                        Value::Object(levels)
                    } else {
                        trend.measurements(rng, 1.0)
                    };
                    dates.insert(date, entry);
                }
                bins.insert(bin.to_string(), Value::Object(dates));
            }
            sites.insert(site.to_string(), Value::Object(bins));
        }
        channels.insert(channel.to_string(), Value::Object(sites));
    }
    Value::Object(channels)
}

fn write_report(path: &Path, data: Value) -> Result<()> {
    let document = json!({
        "data": data,
        "meta": { "147": X_NAME, "148": Y_NAME },
    });
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &document)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    for (file_name, elevated) in [("binned.json", false), ("incremental.json", true)] {
        let path = out_dir.join(file_name);
        write_report(&path, build_data(&mut rng, elevated))?;
        println!(
            "Wrote {} channels × {} sites × {} bins to {}",
            CHANNELS.len(),
            SITES.len(),
            BINS.len(),
            path.display()
        );
    }
    Ok(())
}
