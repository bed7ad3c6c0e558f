use std::path::Path;

use serde_json::{Map, Value as JsonValue};

use super::error::DatasetError;
use super::model::{
    BinData, ChannelData, DateEntry, Dataset, MeasurementMap, MeasurementSelector, Quantities,
    Quantity, SiteData,
};

type JsonObject = Map<String, JsonValue>;

/// `meta` keys holding the x and y measurement names.
pub const X_META_KEY: &str = "147";
pub const Y_META_KEY: &str = "148";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a report document from disk.
pub fn load_file(path: &Path) -> Result<Dataset, DatasetError> {
    let text = std::fs::read_to_string(path)?;
    parse_document(&text)
}

/// Parse a report document from its JSON text.
///
/// Expected schema:
///
/// ```json
/// {
///   "data": { "<channel>": { "<site>": { "<bin>": { "<date>": <value> } } } },
///   "meta": { "147": "<x measurement>", "148": "<y measurement>" }
/// }
/// ```
///
/// where `<value>` is either `{ "<measurement>": { "Area": n, "Volume": n } }`
/// or `{ "<elevation>": { "<measurement>": { "Area": n, "Volume": n } } }`.
pub fn parse_document(text: &str) -> Result<Dataset, DatasetError> {
    let root: JsonValue = serde_json::from_str(text)?;
    from_value(&root)
}

/// Build a [`Dataset`] from an already-parsed document.
pub fn from_value(root: &JsonValue) -> Result<Dataset, DatasetError> {
    let root = root.as_object().ok_or_else(|| DatasetError::NotAnObject {
        path: "<root>".to_string(),
    })?;

    let selector = read_selector(root)?;

    let data = root.get("data").ok_or(DatasetError::MissingData)?;
    let data = data.as_object().ok_or_else(|| DatasetError::NotAnObject {
        path: "data".to_string(),
    })?;

    let channels = data
        .iter()
        .filter_map(|(channel, sites)| {
            let sites = object_or_skip(sites, &[channel.as_str()])?;
            Some(ChannelData {
                name: channel.clone(),
                sites: read_sites(channel, sites, &selector),
            })
        })
        .collect();

    Ok(Dataset { channels, selector })
}

fn read_selector(root: &JsonObject) -> Result<MeasurementSelector, DatasetError> {
    let meta = root.get("meta").and_then(JsonValue::as_object);
    let name = |key: &'static str| {
        meta.and_then(|m| m.get(key))
            .and_then(JsonValue::as_str)
            .map(str::to_string)
            .ok_or(DatasetError::MissingMeta { key })
    };
    Ok(MeasurementSelector::new(name(X_META_KEY)?, name(Y_META_KEY)?))
}

// ---------------------------------------------------------------------------
// Nesting levels
// ---------------------------------------------------------------------------

fn read_sites(channel: &str, sites: &JsonObject, selector: &MeasurementSelector) -> Vec<SiteData> {
    sites
        .iter()
        .filter_map(|(site, bins)| {
            let bins = object_or_skip(bins, &[channel, site.as_str()])?;
            Some(SiteData {
                name: site.clone(),
                bins: bins
                    .iter()
                    .filter_map(|(bin, dates)| {
                        let dates = object_or_skip(dates, &[channel, site.as_str(), bin.as_str()])?;
                        Some(BinData {
                            name: bin.clone(),
                            dates: read_dates(dates, selector, &[channel, site.as_str(), bin.as_str()]),
                        })
                    })
                    .collect(),
            })
        })
        .collect()
}

fn read_dates(
    dates: &JsonObject,
    selector: &MeasurementSelector,
    path: &[&str],
) -> Vec<(String, DateEntry)> {
    dates
        .iter()
        .filter_map(|(date, value)| {
            let mut date_path = path.to_vec();
            date_path.push(date.as_str());
            let value = object_or_skip(value, &date_path)?;
            Some((date.clone(), resolve_date(value, selector)))
        })
        .collect()
}

/// Decide the shape of one date object.
fn resolve_date(value: &JsonObject, selector: &MeasurementSelector) -> DateEntry {
    if holds_measurements(value, selector) {
        return DateEntry::Binned(measurement_map(value));
    }
    let levels = value
        .iter()
        .filter_map(|(elevation, inner)| {
            inner
                .as_object()
                .map(|m| (elevation.clone(), measurement_map(m)))
        })
        .collect();
    DateEntry::Elevated(levels)
}

fn holds_measurements(value: &JsonObject, selector: &MeasurementSelector) -> bool {
    let is_object = |name: &str| value.get(name).is_some_and(JsonValue::is_object);
    is_object(&selector.x) && is_object(&selector.y)
}

fn measurement_map(value: &JsonObject) -> MeasurementMap {
    value
        .iter()
        .filter_map(|(name, m)| {
            let m = m.as_object()?;
            let read = |q: Quantity| m.get(q.key()).and_then(JsonValue::as_f64);
            Some((
                name.clone(),
                Quantities {
                    area: read(Quantity::Area),
                    volume: read(Quantity::Volume),
                },
            ))
        })
        .collect()
}

fn object_or_skip<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a JsonObject> {
    let obj = value.as_object();
    if obj.is_none() {
        log::debug!("Skipping non-object entry at {}", path.join("/"));
    }
    obj
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(data: JsonValue) -> JsonValue {
        json!({ "data": data, "meta": { "147": "Eddy", "148": "Reattachment Bar" } })
    }

    #[test]
    fn reads_selector_from_meta() {
        let ds = from_value(&doc(json!({}))).unwrap();
        assert_eq!(ds.selector, MeasurementSelector::new("Eddy", "Reattachment Bar"));
        assert!(ds.is_empty());
    }

    #[test]
    fn missing_meta_is_an_error() {
        let err = from_value(&json!({ "data": {}, "meta": { "147": "Eddy" } })).unwrap_err();
        assert!(matches!(err, DatasetError::MissingMeta { key: "148" }));

        let err = from_value(&json!({ "meta": { "147": "a", "148": "b" } })).unwrap_err();
        assert!(matches!(err, DatasetError::MissingData));
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(
            parse_document("{ not json"),
            Err(DatasetError::Json(_))
        ));
    }

    #[test]
    fn resolves_binned_and_elevated_dates() {
        let ds = from_value(&doc(json!({
            "Main": { "003L": { "8k-25k": {
                "2009-10-01": {
                    "Eddy": { "Area": 10.0, "Volume": 20.0 },
                    "Reattachment Bar": { "Area": 3.0, "Volume": 4.0 }
                },
                "2010-10-01": {
                    "8.0": {
                        "Eddy": { "Area": 11.0, "Volume": 21.0 },
                        "Reattachment Bar": { "Area": 5.0, "Volume": 6.0 }
                    },
                    "8.5": { "Eddy": { "Area": 12.0 } }
                }
            } } }
        })))
        .unwrap();

        let bin = ds.bin("Main", "003L", "8k-25k").unwrap();
        assert_eq!(bin.dates.len(), 2);
        assert!(matches!(bin.dates[0].1, DateEntry::Binned(_)));
        match &bin.dates[1].1 {
            DateEntry::Elevated(levels) => {
                let names: Vec<&str> = levels.iter().map(|(e, _)| e.as_str()).collect();
                assert_eq!(names, ["8.0", "8.5"]);
                assert_eq!(levels[1].1["Eddy"].volume, None);
            }
            other => panic!("expected elevated entry, got {other:?}"),
        }
    }

    #[test]
    fn skips_malformed_levels_and_keeps_document_order() {
        let ds = from_value(&doc(json!({
            "Zeta": { "009L": { "low": {} } },
            "Alpha": "not an object",
            "Mid": { "003L": 42, "001R": { "high": [] , "low": {} } }
        })))
        .unwrap();

        let names: Vec<&str> = ds.channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Zeta", "Mid"]);
        assert_eq!(ds.channels[1].sites.len(), 1);
        assert_eq!(ds.channels[1].sites[0].bins.len(), 1);
        assert_eq!(ds.channels[1].sites[0].bins[0].name, "low");
    }

    #[test]
    fn non_numeric_quantities_are_absent() {
        let ds = from_value(&doc(json!({
            "Main": { "003L": { "low": { "2009-10-01": {
                "Eddy": { "Area": "12", "Volume": null },
                "Reattachment Bar": { "Area": 3.0 }
            } } } }
        })))
        .unwrap();

        let bin = ds.bin("Main", "003L", "low").unwrap();
        let DateEntry::Binned(map) = &bin.dates[0].1 else {
            panic!("expected binned entry");
        };
        assert_eq!(map["Eddy"], Quantities::default());
        assert_eq!(map["Reattachment Bar"].area, Some(3.0));
    }
}
