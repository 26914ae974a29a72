//! Seam between the engine and the paginated table widget.
//!
//! The widget owns row storage, sorting and paging. The engine only renders
//! typed records into rows, projects checkbox state onto the visible page and
//! listens for the widget's events.

use serde::{Deserialize, Serialize};
use wanted_models::{DownloadState, ExternalSource, RecordId, Service, WantedRecord};

/// Opaque handle to a row of one grid instance. Stale after a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowHandle {
    pub(crate) generation: u64,
    pub(crate) index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Column index and direction, most significant first
pub type SortOrder = Vec<(usize, SortDirection)>;

pub const COLUMN_SELECT: usize = 0;
pub const COLUMN_TITLE: usize = 1;
pub const COLUMN_CATEGORY: usize = 2;
pub const COLUMN_TYPE: usize = 3;
pub const COLUMN_IDS: usize = 4;
pub const COLUMN_SERVICES: usize = 5;
pub const COLUMN_DOWNLOADED: usize = 6;

/// What the download column shows for a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadMarker {
    Yes,
    No,
    /// Placeholder for "no information"
    Unknown,
    /// Waiting on the pending poller
    InProgress,
}

impl DownloadMarker {
    pub fn from_state(state: DownloadState) -> Self {
        match state {
            DownloadState::Yes => DownloadMarker::Yes,
            DownloadState::No => DownloadMarker::No,
            DownloadState::Unknown => DownloadMarker::Unknown,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            DownloadMarker::Yes => "yes",
            DownloadMarker::No => "no",
            DownloadMarker::Unknown => "?",
            DownloadMarker::InProgress => "...",
        }
    }
}

/// One rendered row. `record` holds the attributes the row was rendered from.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub handle: RowHandle,
    pub record: WantedRecord,
    pub marker: DownloadMarker,
    pub cells: Vec<String>,
    pub checked: bool,
}

impl GridRow {
    pub fn id(&self) -> &RecordId {
        &self.record.id
    }

    pub fn render_cells(record: &WantedRecord, marker: DownloadMarker) -> Vec<String> {
        let title = match record.year {
            Some(year) => format!("{} ({})", record.title, year),
            None => record.title.clone(),
        };
        let ids = [ExternalSource::Tmdb, ExternalSource::Tvdb, ExternalSource::Anilist]
        .iter()
        .filter_map(|source| {
            record
                .external_id(*source)
                .map(|id| format!("{}:{}", source.as_str(), id))
        })
        .collect::<Vec<_>>()
        .join(" ");
        let services = Service::ALL
            .iter()
            .filter(|service| record.in_service(**service))
            .map(|service| service.display_name())
            .collect::<Vec<_>>()
            .join(", ");

        vec![
            String::new(),
            title,
            record.category.clone(),
            record.media_type.as_str().to_string(),
            ids,
            services,
            marker.glyph().to_string(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    /// A row checkbox changed, whether a user clicked it or code set it
    SelectionChanged { id: RecordId, checked: bool },
    /// The widget finished a redraw and recreated the visible rows
    Drawn,
}

/// Row predicate registered with the widget's custom filter hook
pub type RowPredicate = Box<dyn Fn(&GridRow) -> bool>;

/// Paged, sortable table of rows. Search text is not held here; it reaches the
/// widget through the predicate passed to [`GridWidget::register_filter`].
pub trait GridWidget {
    /// Tear the widget down and build a new instance from `rows`.
    ///
    /// Sort order, paging and filter registrations reset; previous handles go stale.
    fn rebuild(&mut self, rows: Vec<(WantedRecord, DownloadMarker)>);

    /// Register a predicate consulted on every draw, including widget-driven ones
    fn register_filter(&mut self, predicate: RowPredicate);

    /// Every row, in insertion order
    fn rows(&self) -> Vec<RowHandle>;

    fn row(&self, handle: RowHandle) -> Option<&GridRow>;

    /// Re-render a row in place. Returns `false` if the handle is stale.
    fn render_row(&mut self, handle: RowHandle, record: &WantedRecord, marker: DownloadMarker) -> bool;

    fn remove_row(&mut self, handle: RowHandle) -> bool;

    /// Set a row checkbox; emits `SelectionChanged` when the value changes
    fn set_checked(&mut self, handle: RowHandle, checked: bool);

    /// Re-run filters and sorting. `hold_page` keeps the current page when it still exists.
    fn draw(&mut self, hold_page: bool);

    /// Rows on the current page after the last draw
    fn visible_rows(&self) -> Vec<RowHandle>;

    /// Rows passing the filters on all pages after the last draw
    fn filtered_rows(&self) -> Vec<RowHandle>;

    fn order(&self) -> SortOrder;
    fn set_order(&mut self, order: SortOrder);

    fn page(&self) -> usize;
    fn set_page(&mut self, page: usize);

    fn page_length(&self) -> usize;
    fn set_page_length(&mut self, length: usize);

    fn drain_events(&mut self) -> Vec<GridEvent>;
}
