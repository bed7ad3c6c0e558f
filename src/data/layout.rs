use super::filter::{DatasetNames, Dimension, FilterSelection};
use super::model::{Dataset, Quantity};
use super::series::{extract_with_fit, Fit, Series, SeriesKey};

// ---------------------------------------------------------------------------
// Row / column grouping
// ---------------------------------------------------------------------------

/// One site table: a row per visible channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteGroup {
    pub site: String,
    pub channels: Vec<String>,
}

/// One column group: a column per visible bin under a quantity heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityGroup {
    pub quantity: Quantity,
    pub bins: Vec<String>,
}

/// Group rows by site. Sites and channels keep their first-seen order.
pub fn layout_rows(
    channels: &[String],
    sites: &[String],
    selection: &FilterSelection,
) -> Vec<SiteGroup> {
    let visible_channels: Vec<String> = channels
        .iter()
        .filter(|c| selection.passes(Dimension::Channel, c))
        .cloned()
        .collect();

    sites
        .iter()
        .filter(|s| selection.passes(Dimension::Site, s))
        .map(|site| SiteGroup {
            site: site.clone(),
            channels: visible_channels.clone(),
        })
        .collect()
}

/// Group columns by quantity. Bins keep their first-seen order.
pub fn layout_columns(
    bins: &[String],
    quantities: &[Quantity],
    selection: &FilterSelection,
) -> Vec<QuantityGroup> {
    let visible_bins: Vec<String> = bins
        .iter()
        .filter(|b| selection.passes(Dimension::Bin, b))
        .cloned()
        .collect();

    quantities
        .iter()
        .filter(|q| selection.passes_quantity(**q))
        .map(|&quantity| QuantityGroup {
            quantity,
            bins: visible_bins.clone(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// ReportGrid – the extracted small multiples
// ---------------------------------------------------------------------------

/// One chart in the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub key: SeriesKey,
    pub series: Series,
    pub fit: Option<Fit>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub channel: String,
    /// Cells in column order: quantity groups, then bins within each.
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteTable {
    pub site: String,
    pub rows: Vec<GridRow>,
}

/// Every visible chart for the current selection, laid out as one table per
/// site with shared column headings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportGrid {
    pub columns: Vec<QuantityGroup>,
    pub tables: Vec<SiteTable>,
}

impl ReportGrid {
    /// Lay out the selection and extract each cell's series.
    ///
    /// `names` comes from [`enumerate_names`](super::filter::enumerate_names)
    /// at load time; the dataset is only walked again for extraction.
    pub fn build(dataset: &Dataset, names: &DatasetNames, selection: &FilterSelection) -> Self {
        let columns = layout_columns(&names.bins, &Quantity::ALL, selection);
        let tables = layout_rows(&names.channels, &names.sites, selection)
            .into_iter()
            .map(|group| {
                let rows = group
                    .channels
                    .iter()
                    .map(|channel| GridRow {
                        channel: channel.clone(),
                        cells: extract_row(dataset, channel, &group.site, &columns),
                    })
                    .collect();
                SiteTable {
                    site: group.site,
                    rows,
                }
            })
            .collect();

        let grid = ReportGrid { columns, tables };
        log::debug!("Rebuilt report grid with {} cells", grid.cell_count());
        grid
    }

    pub fn cell_count(&self) -> usize {
        self.tables
            .iter()
            .flat_map(|t| &t.rows)
            .map(|r| r.cells.len())
            .sum()
    }

    pub fn column_count(&self) -> usize {
        self.columns.iter().map(|c| c.bins.len()).sum()
    }
}

fn extract_row(
    dataset: &Dataset,
    channel: &str,
    site: &str,
    columns: &[QuantityGroup],
) -> Vec<GridCell> {
    let mut cells = Vec::new();
    for col in columns {
        for bin in &col.bins {
            let key = SeriesKey::new(channel, site, bin, col.quantity);
            let (series, fit) = extract_with_fit(dataset, &key);
            cells.push(GridCell { key, series, fit });
        }
    }
    cells
}
