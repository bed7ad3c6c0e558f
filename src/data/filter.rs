use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::model::{Dataset, Quantity};

// ---------------------------------------------------------------------------
// Dimensions and names
// ---------------------------------------------------------------------------

/// The four axes a report can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Channel,
    Site,
    Bin,
    Quantity,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Channel,
        Dimension::Site,
        Dimension::Bin,
        Dimension::Quantity,
    ];
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Channel => write!(f, "Channel"),
            Dimension::Site => write!(f, "Site"),
            Dimension::Bin => write!(f, "Bin"),
            Dimension::Quantity => write!(f, "Area or Volume"),
        }
    }
}

/// Distinct channel, site and bin names in first-seen document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetNames {
    pub channels: Vec<String>,
    pub sites: Vec<String>,
    pub bins: Vec<String>,
}

impl DatasetNames {
    /// Every value selectable for `dim`.
    pub fn values(&self, dim: Dimension) -> Vec<String> {
        match dim {
            Dimension::Channel => self.channels.clone(),
            Dimension::Site => self.sites.clone(),
            Dimension::Bin => self.bins.clone(),
            Dimension::Quantity => Quantity::ALL.iter().map(|q| q.key().to_string()).collect(),
        }
    }
}

/// Walk the channel/site/bin levels once and collect each level's names.
pub fn enumerate_names(dataset: &Dataset) -> DatasetNames {
    let mut names = DatasetNames::default();
    for channel in &dataset.channels {
        push_unique(&mut names.channels, &channel.name);
        for site in &channel.sites {
            push_unique(&mut names.sites, &site.name);
            for bin in &site.bins {
                push_unique(&mut names.bins, &bin.name);
            }
        }
    }
    names
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

// ---------------------------------------------------------------------------
// Filter selection
// ---------------------------------------------------------------------------

/// A change to the filter selection reported by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    /// Add the value if absent, remove it if present.
    Toggle(Dimension, String),
    /// Drop the restriction on one dimension.
    Clear(Dimension),
    /// Drop every restriction.
    Reset,
}

/// Chosen values per dimension.
///
/// A dimension with no chosen values is unrestricted: every value passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    selected: BTreeMap<Dimension, BTreeSet<String>>,
}

impl FilterSelection {
    /// Whether `value` passes the filter on `dim`.
    pub fn passes(&self, dim: Dimension, value: &str) -> bool {
        match self.selected.get(&dim) {
            Some(chosen) if !chosen.is_empty() => chosen.contains(value),
            _ => true,
        }
    }

    pub fn passes_quantity(&self, quantity: Quantity) -> bool {
        self.passes(Dimension::Quantity, quantity.key())
    }

    pub fn is_selected(&self, dim: Dimension, value: &str) -> bool {
        self.selected
            .get(&dim)
            .is_some_and(|chosen| chosen.contains(value))
    }

    pub fn selected_count(&self, dim: Dimension) -> usize {
        self.selected.get(&dim).map_or(0, BTreeSet::len)
    }

    /// Whether no dimension is restricted.
    pub fn is_unrestricted(&self) -> bool {
        self.selected.values().all(BTreeSet::is_empty)
    }

    /// Apply one UI event. Returns whether the selection changed.
    pub fn apply(&mut self, event: SelectionEvent) -> bool {
        match event {
            SelectionEvent::Toggle(dim, value) => {
                let chosen = self.selected.entry(dim).or_default();
                if !chosen.remove(&value) {
                    chosen.insert(value);
                }
                true
            }
            SelectionEvent::Clear(dim) => self
                .selected
                .remove(&dim)
                .is_some_and(|chosen| !chosen.is_empty()),
            SelectionEvent::Reset => {
                let changed = !self.is_unrestricted();
                self.selected.clear();
                changed
            }
        }
    }
}

impl<const N: usize> From<[(Dimension, &[&str]); N]> for FilterSelection {
    fn from(entries: [(Dimension, &[&str]); N]) -> Self {
        let selected = entries
            .into_iter()
            .map(|(dim, values)| (dim, values.iter().map(|v| v.to_string()).collect()))
            .collect();
        Self { selected }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data::loader::from_value;

    #[test]
    fn passes_with_and_without_restriction() {
        let selection = FilterSelection::from([(Dimension::Channel, &["A"][..])]);
        assert!(selection.passes(Dimension::Channel, "A"));
        assert!(!selection.passes(Dimension::Channel, "B"));
        assert!(selection.passes(Dimension::Site, "anything"));
        assert!(FilterSelection::default().passes(Dimension::Bin, "anything"));
    }

    #[test]
    fn quantity_filter() {
        let selection = FilterSelection::from([(Dimension::Quantity, &["Volume"][..])]);
        assert!(selection.passes_quantity(Quantity::Volume));
        assert!(!selection.passes_quantity(Quantity::Area));
    }

    #[test]
    fn toggling_back_to_empty_lifts_the_restriction() {
        let mut selection = FilterSelection::default();
        assert!(selection.apply(SelectionEvent::Toggle(Dimension::Site, "003L".into())));
        assert!(!selection.passes(Dimension::Site, "009L"));
        assert_eq!(selection.selected_count(Dimension::Site), 1);

        assert!(selection.apply(SelectionEvent::Toggle(Dimension::Site, "003L".into())));
        assert!(selection.passes(Dimension::Site, "009L"));
        assert!(selection.is_unrestricted());
    }

    #[test]
    fn clear_and_reset_report_changes() {
        let mut selection = FilterSelection::from([
            (Dimension::Channel, &["A"][..]),
            (Dimension::Bin, &["low", "high"][..]),
        ]);
        assert!(selection.apply(SelectionEvent::Clear(Dimension::Channel)));
        assert!(!selection.apply(SelectionEvent::Clear(Dimension::Channel)));
        assert!(selection.is_selected(Dimension::Bin, "high"));

        assert!(selection.apply(SelectionEvent::Reset));
        assert!(!selection.apply(SelectionEvent::Reset));
        assert_eq!(selection, FilterSelection::default());
    }

    #[test]
    fn names_are_distinct_in_first_seen_order() {
        let ds = from_value(&json!({
            "data": {
                "Zeta": {
                    "009L": { "high": {}, "low": {} },
                    "003L": { "low": {} }
                },
                "Alpha": {
                    "003L": { "mid": {}, "high": {} },
                    "001R": { "low": {} }
                }
            },
            "meta": { "147": "Eddy", "148": "Bar" }
        }))
        .unwrap();

        let names = enumerate_names(&ds);
        assert_eq!(names.channels, ["Zeta", "Alpha"]);
        assert_eq!(names.sites, ["009L", "003L", "001R"]);
        assert_eq!(names.bins, ["high", "low", "mid"]);
        assert_eq!(names.values(Dimension::Quantity), ["Area", "Volume"]);
    }
}
