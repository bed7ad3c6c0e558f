use std::path::{Path, PathBuf};

use sandbar_viewer::config::ViewerConfig;
use sandbar_viewer::data::filter::{enumerate_names, DatasetNames, FilterSelection, SelectionEvent};
use sandbar_viewer::data::layout::ReportGrid;
use sandbar_viewer::data::model::{Dataset, DatasetKind};
use sandbar_viewer::data::series::{extract_with_fit, Fit, Series, SeriesKey};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Drill-down view
// ---------------------------------------------------------------------------

/// The enlarged chart opened by clicking a grid cell.
pub struct DrillDown {
    pub key: SeriesKey,
    pub series: Series,
    pub fit: Option<Fit>,
    /// Cleared by the window's close button.
    pub open: bool,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ViewerConfig,

    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<Dataset>,

    /// File the dataset was read from.
    pub source: Option<PathBuf>,

    /// Channel/site/bin names, enumerated once per dataset.
    pub names: DatasetNames,

    /// Current filter choices.
    pub selection: FilterSelection,

    /// Charts for the current selection, rebuilt on every selection change.
    pub grid: ReportGrid,

    pub drill_down: Option<DrillDown>,

    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            dataset: None,
            source: None,
            names: DatasetNames::default(),
            selection: FilterSelection::default(),
            grid: ReportGrid::default(),
            drill_down: None,
            color_map: ColorMap::default(),
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset: enumerate names, reset filters, lay out.
    pub fn set_dataset(&mut self, dataset: Dataset, source: PathBuf) {
        self.names = enumerate_names(&dataset);
        self.selection = FilterSelection::default();
        self.drill_down = None;
        self.dataset = Some(dataset);
        self.source = Some(source);
        self.status_message = None;
        self.rebuild_grid();
    }

    pub fn kind(&self) -> Option<DatasetKind> {
        self.source.as_deref().map(DatasetKind::from_path)
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Apply a filter change and re-extract the grid if anything changed.
    pub fn handle(&mut self, event: SelectionEvent) {
        if self.selection.apply(event) {
            self.rebuild_grid();
        }
    }

    fn rebuild_grid(&mut self) {
        self.grid = match &self.dataset {
            Some(ds) => ReportGrid::build(ds, &self.names, &self.selection),
            None => ReportGrid::default(),
        };
    }

    /// Open the drill-down view for `key`, extracting its series afresh.
    pub fn open_drill_down(&mut self, key: SeriesKey) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let (series, fit) = extract_with_fit(ds, &key);
        self.drill_down = Some(DrillDown {
            key,
            series,
            fit,
            open: true,
        });
    }

    /// Drop the drill-down once its window has been closed.
    pub fn prune_drill_down(&mut self) {
        if self.drill_down.as_ref().is_some_and(|d| !d.open) {
            self.drill_down = None;
        }
    }
}
