use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Quantity – which of the two values a measurement carries
// ---------------------------------------------------------------------------

/// The two quantity kinds every measurement carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quantity {
    Area,
    Volume,
}

impl Quantity {
    /// Display and column order.
    pub const ALL: [Quantity; 2] = [Quantity::Area, Quantity::Volume];

    /// Key used for this quantity inside a measurement object.
    pub fn key(self) -> &'static str {
        match self {
            Quantity::Area => "Area",
            Quantity::Volume => "Volume",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Quantity::ALL.into_iter().find(|q| q.key() == key)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Measurements
// ---------------------------------------------------------------------------

/// Area and volume of one measurement. A value absent from the source
/// stays `None`; it is never coerced to zero here.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Quantities {
    pub area: Option<f64>,
    pub volume: Option<f64>,
}

impl Quantities {
    pub fn get(&self, quantity: Quantity) -> Option<f64> {
        match quantity {
            Quantity::Area => self.area,
            Quantity::Volume => self.volume,
        }
    }
}

/// measurement_name → quantities.
pub type MeasurementMap = BTreeMap<String, Quantities>;

/// The (x, y) measurement names plotted against each other.
///
/// Read once from the document's `meta` block and fixed for the lifetime
/// of the loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementSelector {
    pub x: String,
    pub y: String,
}

impl MeasurementSelector {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    /// Look up the (x, y) pair for `quantity`, if both are present.
    pub fn pair(&self, map: &MeasurementMap, quantity: Quantity) -> Option<(f64, f64)> {
        let x = map.get(&self.x)?.get(quantity)?;
        let y = map.get(&self.y)?.get(quantity)?;
        Some((x, y))
    }
}

// ---------------------------------------------------------------------------
// DateEntry – binned vs. elevation-keyed survey dates
// ---------------------------------------------------------------------------

/// One survey date under a bin.
///
/// The source format does not tag which shape a date uses; the loader
/// resolves it once against the dataset's [`MeasurementSelector`]:
/// a date holding both selected measurements directly is `Binned`,
/// anything else is read as elevation → measurements.
#[derive(Debug, Clone, PartialEq)]
pub enum DateEntry {
    Binned(MeasurementMap),
    Elevated(Vec<(String, MeasurementMap)>),
}

// ---------------------------------------------------------------------------
// Dataset tree: channel → site → bin → date
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BinData {
    pub name: String,
    /// Dates in document order.
    pub dates: Vec<(String, DateEntry)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteData {
    pub name: String,
    pub bins: Vec<BinData>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelData {
    pub name: String,
    pub sites: Vec<SiteData>,
}

/// The full parsed report document. Read-only after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Channels in document order.
    pub channels: Vec<ChannelData>,
    pub selector: MeasurementSelector,
}

impl Dataset {
    /// Find the bin at `channel/site/bin`, if the document has it.
    pub fn bin(&self, channel: &str, site: &str, bin: &str) -> Option<&BinData> {
        self.channels
            .iter()
            .find(|c| c.name == channel)?
            .sites
            .iter()
            .find(|s| s.name == site)?
            .bins
            .iter()
            .find(|b| b.name == bin)
    }

    /// Total number of survey dates across all bins.
    pub fn date_count(&self) -> usize {
        self.channels
            .iter()
            .flat_map(|c| &c.sites)
            .flat_map(|s| &s.bins)
            .map(|b| b.dates.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DatasetKind – binned.json vs. incremental.json
// ---------------------------------------------------------------------------

pub const BINNED_FILE: &str = "binned.json";
pub const INCREMENTAL_FILE: &str = "incremental.json";

/// Which of the two report files a dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    Binned,
    Incremental,
}

impl DatasetKind {
    /// Classify by file name: `incremental*` is incremental, everything else binned.
    pub fn from_path(path: &Path) -> Self {
        let stem = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        if stem.starts_with("incremental") {
            DatasetKind::Incremental
        } else {
            DatasetKind::Binned
        }
    }

    /// The other kind.
    pub fn toggled(self) -> Self {
        match self {
            DatasetKind::Binned => DatasetKind::Incremental,
            DatasetKind::Incremental => DatasetKind::Binned,
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            DatasetKind::Binned => BINNED_FILE,
            DatasetKind::Incremental => INCREMENTAL_FILE,
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetKind::Binned => write!(f, "Binned"),
            DatasetKind::Incremental => write!(f, "Incremental"),
        }
    }
}

/// Path of the companion report file in the same directory.
pub fn sibling_path(path: &Path) -> PathBuf {
    let other = DatasetKind::from_path(path).toggled();
    path.with_file_name(other.file_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_keys_round_trip() {
        assert_eq!(Quantity::from_key("Area"), Some(Quantity::Area));
        assert_eq!(Quantity::from_key("Volume"), Some(Quantity::Volume));
        assert_eq!(Quantity::from_key("volume"), None);
        assert_eq!(Quantity::ALL, [Quantity::Area, Quantity::Volume]);
    }

    #[test]
    fn selector_pair_requires_both_values() {
        let selector = MeasurementSelector::new("Eddy", "Reattachment Bar");
        let mut map = MeasurementMap::new();
        map.insert(
            "Eddy".into(),
            Quantities {
                area: Some(10.0),
                volume: None,
            },
        );
        map.insert(
            "Reattachment Bar".into(),
            Quantities {
                area: Some(4.0),
                volume: Some(2.0),
            },
        );

        assert_eq!(selector.pair(&map, Quantity::Area), Some((10.0, 4.0)));
        assert_eq!(selector.pair(&map, Quantity::Volume), None);
    }

    #[test]
    fn kind_and_sibling_paths() {
        let binned = Path::new("/reports/binned.json");
        let incremental = Path::new("/reports/incremental.json");

        assert_eq!(DatasetKind::from_path(binned), DatasetKind::Binned);
        assert_eq!(DatasetKind::from_path(incremental), DatasetKind::Incremental);
        assert_eq!(sibling_path(binned), incremental);
        assert_eq!(sibling_path(incremental), binned);
        assert_eq!(
            sibling_path(Path::new("/reports/other.json")),
            Path::new("/reports/incremental.json")
        );
    }
}
